mod model_card;
mod progress;
mod tokens;

pub use model_card::{
    BaseModel, CardData, HubRegistry, ModelCard, ModelRegistry, RegistryError,
    DEFAULT_HF_ENDPOINT,
};
pub use progress::NiceProgressBar;
pub use tokens::{get_token, TokenSource, DEFAULT_TOKEN_ENV_VAR};
