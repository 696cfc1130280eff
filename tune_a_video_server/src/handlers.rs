//! Event handlers of the demo page.
//!
//! Each handler has a plain input and output type and knows nothing about HTTP, so the bindings in
//! [`crate::routes`] stay thin and the handlers can be driven directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tune_a_video_core::{
    example_requests, GenerationRequest, ModelInfoLookup, VideoArtifact, EXAMPLES,
};

use crate::{error::AppError, state::AppState, video_store::VideoStore};

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfoInput {
    pub model_id: String,
}

/// Both read-only fields of the model info panel, always updated together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfoOutput {
    pub base_model: String,
    pub training_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOutput {
    pub url: String,
}

/// Model selector changed.
pub async fn load_model_info(state: &AppState, input: ModelInfoInput) -> ModelInfoOutput {
    let lookup = state.resolver.resolve(&input.model_id).await;
    if let ModelInfoLookup::Fallback(reason) = &lookup {
        debug!(model_id = %input.model_id, ?reason, "showing empty model info");
    }
    let (base_model, training_prompt) = lookup.display_fields();
    ModelInfoOutput {
        base_model,
        training_prompt,
    }
}

async fn publish(
    videos: &Arc<VideoStore>,
    artifact: VideoArtifact,
) -> Result<VideoOutput, AppError> {
    let videos = videos.clone();
    let url = tokio::task::spawn_blocking(move || videos.publish(&artifact))
        .await
        .map_err(|err| AppError::Generation(err.into()))??;
    Ok(VideoOutput { url })
}

/// Prompt submitted or Generate clicked.
pub async fn generate(
    state: &AppState,
    request: GenerationRequest,
) -> Result<VideoOutput, AppError> {
    request.validate()?;
    info!(%request, "generation requested");
    let artifact = state
        .queue
        .submit(request)
        .await
        .map_err(AppError::Generation)?;
    publish(&state.videos, artifact).await
}

/// Example row clicked. Served from the example cache when it holds the result.
pub async fn run_example(state: &AppState, index: usize) -> Result<VideoOutput, AppError> {
    let example = EXAMPLES.get(index).ok_or(AppError::UnknownExample(index))?;
    if let Some(artifact) = state.example_cache.get(index) {
        debug!(index, "serving cached example");
        return publish(&state.videos, artifact.clone()).await;
    }
    generate(state, example.to_request()).await
}

pub fn list_examples() -> Vec<GenerationRequest> {
    example_requests()
}
