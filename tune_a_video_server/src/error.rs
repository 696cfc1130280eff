use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use tune_a_video_core::controls::ControlError;

/// Message shown to users when generation fails. Details stay in the logs.
pub const GENERATION_FAILED: &str = "Generation failed. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidInput(#[from] ControlError),
    #[error("there is no example at index {0}")]
    UnknownExample(usize),
    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),
    #[error("could not publish video: {0}")]
    Publish(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownExample(_) => StatusCode::NOT_FOUND,
            Self::Generation(_) | Self::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::InvalidInput(_) | Self::UnknownExample(_) => self.to_string(),
            Self::Generation(_) | Self::Publish(_) => {
                error!(error = %self, "request failed");
                GENERATION_FAILED.to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
