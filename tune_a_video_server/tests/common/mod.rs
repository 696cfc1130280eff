#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use futures::future::{BoxFuture, FutureExt};
use tempfile::TempDir;
use tune_a_video_core::{
    BaseModel, CardData, ExampleCache, GenerationQueue, GenerationRequest, InferencePipeline,
    ModelCard, ModelInfoResolver, ModelRegistry, RegistryError, VideoArtifact,
};
use tune_a_video_server::{AppState, VideoStore};

pub const SURFING: &str = "Tune-A-Video-library/a-man-is-surfing";

#[derive(Default)]
pub struct FakeRegistry {
    pub cards: HashMap<String, CardData>,
    pub calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn with_surfing_card() -> Self {
        let mut cards = HashMap::new();
        cards.insert(
            SURFING.to_string(),
            CardData {
                base_model: Some(BaseModel::One("CompVis/stable-diffusion-v1-4".to_string())),
                training_prompt: Some("A man is surfing".to_string()),
                ..Default::default()
            },
        );
        Self {
            cards,
            ..Default::default()
        }
    }
}

impl ModelRegistry for FakeRegistry {
    fn get_model_card<'a>(
        &'a self,
        model_id: &'a str,
        _token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ModelCard, RegistryError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cards
                .get(model_id)
                .cloned()
                .map(|data| ModelCard {
                    model_id: model_id.to_string(),
                    data,
                })
                .ok_or_else(|| RegistryError::NotFound(model_id.to_string()))
        }
        .boxed()
    }
}

/// Writes a small file per request into `dir` and remembers what it was asked.
pub struct FakePipeline {
    pub dir: PathBuf,
    pub seen: Mutex<Vec<GenerationRequest>>,
    pub fail: bool,
    counter: AtomicUsize,
}

impl FakePipeline {
    pub fn new(dir: PathBuf, fail: bool) -> Self {
        Self {
            dir,
            seen: Mutex::new(Vec::new()),
            fail,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn seen(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl InferencePipeline for FakePipeline {
    fn run(&self, request: &GenerationRequest) -> anyhow::Result<VideoArtifact> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            anyhow::bail!("CUDA out of memory");
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(format!("video-{n}.mp4"));
        fs::write(&path, format!("{}|{}", request.prompt, request.seed))?;
        Ok(VideoArtifact { path })
    }
}

pub struct Harness {
    pub state: AppState,
    pub registry: Arc<FakeRegistry>,
    pub pipeline: Arc<FakePipeline>,
    pub dir: TempDir,
}

pub fn harness_with(fail: bool, example_cache: Option<ExampleCache>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let videos = VideoStore::new(dir.path()).unwrap();
    let registry = Arc::new(FakeRegistry::with_surfing_card());
    let pipeline = Arc::new(FakePipeline::new(videos.root().to_path_buf(), fail));
    let resolver = ModelInfoResolver::new(registry.clone(), None);
    let queue = GenerationQueue::new(pipeline.clone(), 1);
    let state = AppState::new(
        resolver,
        queue,
        videos,
        example_cache.unwrap_or_default(),
    );
    Harness {
        state,
        registry,
        pipeline,
        dir,
    }
}

pub fn harness() -> Harness {
    harness_with(false, None)
}
