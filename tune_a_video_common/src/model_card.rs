use std::{fmt::Display, time::Duration};

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header::AUTHORIZATION, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Registry queried when no endpoint override is configured.
pub const DEFAULT_HF_ENDPOINT: &str = "https://huggingface.co";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Failure categories of a model card lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("model `{0}` was not found in the registry")]
    NotFound(String),
    #[error("access to model `{0}` was denied")]
    Unauthorized(String),
    #[error("registry answered with status {status} for model `{model_id}`")]
    Status { model_id: String, status: u16 },
    #[error("malformed model card for `{model_id}`: {source}")]
    MalformedCard {
        model_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The `base_model` card field. Publishers write either a single id or a list.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BaseModel {
    One(String),
    Many(Vec<String>),
}

impl BaseModel {
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(id) => Some(id.as_str()),
            Self::Many(ids) => ids.first().map(String::as_str),
        }
    }
}

/// Structured metadata block of a model card. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CardData {
    #[serde(default)]
    pub base_model: Option<BaseModel>,
    #[serde(default)]
    pub training_prompt: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelCard {
    pub model_id: String,
    pub data: CardData,
}

impl Display for ModelCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model card: {}", self.model_id)
    }
}

#[derive(Deserialize)]
struct ModelInfoResponse {
    #[serde(rename = "cardData", default)]
    card_data: Option<CardData>,
}

impl ModelCard {
    /// Decode a card from the body of the registry's `api/models/<id>` endpoint.
    pub fn from_api_json(model_id: &str, body: &str) -> Result<Self, RegistryError> {
        let response: ModelInfoResponse =
            serde_json::from_str(body).map_err(|source| RegistryError::MalformedCard {
                model_id: model_id.to_string(),
                source,
            })?;
        Ok(Self {
            model_id: model_id.to_string(),
            data: response.card_data.unwrap_or_default(),
        })
    }
}

/// A source of model cards.
pub trait ModelRegistry: Send + Sync {
    fn get_model_card<'a>(
        &'a self,
        model_id: &'a str,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ModelCard, RegistryError>>;
}

/// Model registry backed by the Hugging Face Hub HTTP API.
pub struct HubRegistry {
    endpoint: Url,
    client: reqwest::Client,
}

impl HubRegistry {
    pub fn new<S: AsRef<str>>(endpoint: S) -> Result<Self, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidEndpoint {
            endpoint: endpoint.as_ref().to_string(),
            reason,
        };
        let endpoint_url =
            Url::parse(endpoint.as_ref()).map_err(|err| invalid(err.to_string()))?;
        if endpoint_url.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            endpoint: endpoint_url,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// `{endpoint}/api/models/{namespace}/{name}`, with every id part kept inside its own path
    /// segment. Ids with empty, `.` or `..` parts name no model.
    fn card_url(&self, model_id: &str) -> Result<Url, RegistryError> {
        let parts: Vec<&str> = model_id.split('/').collect();
        if parts
            .iter()
            .any(|part| part.is_empty() || *part == "." || *part == "..")
        {
            return Err(RegistryError::NotFound(model_id.to_string()));
        }

        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| RegistryError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "models"])
            .extend(&parts);
        Ok(url)
    }
}

/// Map a non-success registry status to its error category.
fn classify_status(model_id: &str, status: StatusCode) -> Option<RegistryError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND => RegistryError::NotFound(model_id.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RegistryError::Unauthorized(model_id.to_string())
        }
        other => RegistryError::Status {
            model_id: model_id.to_string(),
            status: other.as_u16(),
        },
    })
}

impl ModelRegistry for HubRegistry {
    fn get_model_card<'a>(
        &'a self,
        model_id: &'a str,
        token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ModelCard, RegistryError>> {
        async move {
            let url = self.card_url(model_id)?;
            debug!(%url, "fetching model card");

            let mut request = self.client.get(url);
            if let Some(token) = token {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let response = request.send().await?;
            if let Some(err) = classify_status(model_id, response.status()) {
                return Err(err);
            }
            let body = response.text().await?;
            ModelCard::from_api_json(model_id, &body)
        }
        .boxed()
    }
}
