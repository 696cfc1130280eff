//! Core crate of the Tune-A-Video demo.
//!
//! The crate holds no model code. Inference and model cards come from injected services, and this
//! crate provides the pieces the front-ends share: control contracts, the model info lookup, a
//! fair generation queue and the example presets.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tune_a_video_core::{
//!     CommandPipeline, GenerationQueue, GenerationRequest, HubRegistry, ModelInfoResolver,
//!     DEFAULT_HF_ENDPOINT,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let token = std::env::var("HF_TOKEN").ok();
//! let resolver = ModelInfoResolver::new(
//!     Arc::new(HubRegistry::new(DEFAULT_HF_ENDPOINT)?),
//!     token.clone(),
//! );
//! let (base_model, training_prompt) = resolver
//!     .resolve("Tune-A-Video-library/a-man-is-surfing")
//!     .await
//!     .display_fields();
//! println!("{base_model}: {training_prompt}");
//!
//! let pipeline = CommandPipeline::new("python", vec!["infer.py".to_string()], "videos", token);
//! let queue = GenerationQueue::new(Arc::new(pipeline), 1);
//! let video = queue
//!     .submit(GenerationRequest {
//!         prompt: "A panda is surfing.".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{}", video.path.display());
//! # Ok(())
//! # }
//! ```

pub mod controls;
mod examples;
mod model_info;
mod pipeline;
mod queue;
mod request;

pub use examples::{
    cache_examples_enabled, example_requests, Example, ExampleCache, CACHE_EXAMPLES_SYSTEM,
    EXAMPLES,
};
pub use model_info::{FallbackReason, ModelInfo, ModelInfoLookup, ModelInfoResolver};
pub use pipeline::{CommandPipeline, InferencePipeline, VideoArtifact};
pub use queue::{GenerationQueue, QueueStatus};
pub use request::GenerationRequest;
pub use tune_a_video_common::{
    get_token, BaseModel, CardData, HubRegistry, ModelCard, ModelRegistry, RegistryError,
    TokenSource, DEFAULT_HF_ENDPOINT,
};
