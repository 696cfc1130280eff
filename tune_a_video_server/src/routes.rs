use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tune_a_video_core::{GenerationRequest, QueueStatus};

use crate::{
    error::AppError,
    handlers::{self, ModelInfoInput, ModelInfoOutput, VideoOutput},
    state::AppState,
    video_store::VIDEOS_ROUTE,
};

const APP_JS: &str = include_str!("../assets/app.js");
const STYLE_CSS: &str = include_str!("../assets/style.css");

pub fn router(state: AppState) -> Router {
    let videos = ServeDir::new(state.videos.root());
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/assets/app.js", get(script))
        .route("/assets/style.css", get(style))
        .route("/api/model-info", post(model_info))
        .route("/api/generate", post(generate))
        .route("/api/examples", get(examples))
        .route("/api/examples/{index}", post(example))
        .route("/api/queue", get(queue))
        .nest_service(VIDEOS_ROUTE, videos)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

async fn health() -> &'static str {
    "ok"
}

async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn model_info(
    State(state): State<AppState>,
    Json(input): Json<ModelInfoInput>,
) -> Json<ModelInfoOutput> {
    Json(handlers::load_model_info(&state, input).await)
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<VideoOutput>, AppError> {
    handlers::generate(&state, request).await.map(Json)
}

async fn examples() -> Json<Vec<GenerationRequest>> {
    Json(handlers::list_examples())
}

async fn example(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<VideoOutput>, AppError> {
    handlers::run_example(&state, index).await.map(Json)
}

async fn queue(State(state): State<AppState>) -> Json<QueueStatus> {
    Json(state.queue.status())
}
