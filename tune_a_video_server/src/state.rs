use std::sync::Arc;

use tune_a_video_core::{ExampleCache, GenerationQueue, ModelInfoResolver};

use crate::{
    video_store::VideoStore,
    view::{demo_page, render_page},
};

/// Services shared by every handler. Built once at startup and passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ModelInfoResolver>,
    pub queue: GenerationQueue,
    pub videos: Arc<VideoStore>,
    pub example_cache: Arc<ExampleCache>,
    pub page: Arc<str>,
}

impl AppState {
    pub fn new(
        resolver: ModelInfoResolver,
        queue: GenerationQueue,
        videos: VideoStore,
        example_cache: ExampleCache,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            queue,
            videos: Arc::new(videos),
            example_cache: Arc::new(example_cache),
            page: render_page(&demo_page()).into(),
        }
    }
}
