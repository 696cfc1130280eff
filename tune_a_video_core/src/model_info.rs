//! Best-effort lookup of the provenance shown next to the model selector.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use tune_a_video_common::{BaseModel, ModelCard, ModelRegistry, RegistryError};

/// The two read-only fields of the model info panel. Empty means unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub base_model: String,
    pub training_prompt: String,
}

impl ModelInfo {
    pub fn from_card(card: &ModelCard) -> Self {
        Self {
            base_model: card
                .data
                .base_model
                .as_ref()
                .and_then(BaseModel::first)
                .unwrap_or_default()
                .to_string(),
            training_prompt: card.data.training_prompt.clone().unwrap_or_default(),
        }
    }
}

/// Why a lookup fell back to empty fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NotFound,
    Unauthorized,
    RegistryStatus(u16),
    MalformedCard,
    Unreachable,
}

impl From<&RegistryError> for FallbackReason {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => Self::NotFound,
            RegistryError::Unauthorized(_) => Self::Unauthorized,
            RegistryError::Status { status, .. } => Self::RegistryStatus(*status),
            RegistryError::MalformedCard { .. } => Self::MalformedCard,
            RegistryError::InvalidEndpoint { .. } | RegistryError::Transport(_) => {
                Self::Unreachable
            }
        }
    }
}

/// Outcome of a model info lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelInfoLookup {
    Resolved(ModelInfo),
    Fallback(FallbackReason),
}

impl ModelInfoLookup {
    pub fn into_info(self) -> ModelInfo {
        match self {
            Self::Resolved(info) => info,
            Self::Fallback(_) => ModelInfo::default(),
        }
    }

    /// `(base_model, training_prompt)`, both empty on fallback.
    pub fn display_fields(&self) -> (String, String) {
        match self {
            Self::Resolved(info) => (info.base_model.clone(), info.training_prompt.clone()),
            Self::Fallback(_) => (String::new(), String::new()),
        }
    }
}

pub struct ModelInfoResolver {
    registry: Arc<dyn ModelRegistry>,
    token: Option<String>,
}

impl ModelInfoResolver {
    pub fn new(registry: Arc<dyn ModelRegistry>, token: Option<String>) -> Self {
        Self { registry, token }
    }

    /// Fetch the card for `model_id`. Registry failures never escape; they become a
    /// [`ModelInfoLookup::Fallback`] carrying the failure category.
    pub async fn resolve(&self, model_id: &str) -> ModelInfoLookup {
        match self
            .registry
            .get_model_card(model_id, self.token.as_deref())
            .await
        {
            Ok(card) => {
                debug!(model_id, "resolved model card");
                ModelInfoLookup::Resolved(ModelInfo::from_card(&card))
            }
            Err(err @ RegistryError::NotFound(_)) => {
                debug!(model_id, error = %err, "no model card");
                ModelInfoLookup::Fallback((&err).into())
            }
            Err(err) => {
                warn!(model_id, error = %err, "model card lookup failed");
                ModelInfoLookup::Fallback((&err).into())
            }
        }
    }
}
