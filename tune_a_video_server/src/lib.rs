//! Web front-end of the Tune-A-Video demo.
//!
//! [`view`] describes the page, [`handlers`] answer its events and [`routes`] binds the two over
//! HTTP. All services are constructed by the caller and handed over in an [`AppState`].

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod video_store;
pub mod view;

pub use error::AppError;
pub use routes::router;
pub use state::AppState;
pub use video_store::VideoStore;
