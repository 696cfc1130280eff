mod common;

use std::sync::atomic::Ordering;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{harness, harness_with, SURFING};
use serde_json::{json, Value};
use tower::ServiceExt;
use tune_a_video_core::GenerationRequest;
use tune_a_video_server::{error::GENERATION_FAILED, router};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn panda() -> Value {
    json!({
        "model_id": SURFING,
        "prompt": "A panda is surfing.",
        "video_length": 8,
        "fps": 1,
        "seed": 3,
        "num_steps": 50,
        "guidance_scale": 7.5
    })
}

#[tokio::test]
async fn index_serves_the_demo_page() {
    let h = harness();
    let app = router(h.state.clone());

    let (status, body) = send(&app, get("/")).await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<a href=\"https://tuneavideo.github.io/\">Tune-A-Video</a>"));
    for id in [
        "model_id",
        "prompt",
        "video_length",
        "fps",
        "seed",
        "num_steps",
        "guidance_scale",
        "run",
        "result",
    ] {
        assert!(html.contains(&format!("id=\"{id}\"")), "{id}");
    }

    let (status, script) = send(&app, get("/assets/app.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(script).unwrap().contains("/api/generate"));
}

#[tokio::test]
async fn client_script_keeps_model_info_and_results_consistent() {
    let h = harness();
    let app = router(h.state.clone());

    let (status, script) = send(&app, get("/assets/app.js")).await;
    let script = String::from_utf8(script).unwrap();
    assert_eq!(status, StatusCode::OK);

    // Filling the model from an example refreshes the model info like a manual change.
    assert!(script.contains("control.dispatchEvent(new Event(\"change\"))"));
    // Replies for a model that is no longer selected are dropped.
    assert!(script.contains("if ($(\"model_id\").value !== modelId) return;"));
    // Enter does not start a second generation while one is running.
    assert!(script.contains("if ($(\"run\").disabled) return;"));
}

#[tokio::test]
async fn model_info_endpoint_returns_both_fields() {
    let h = harness();
    let app = router(h.state.clone());

    let (status, body) = send(
        &app,
        post_json("/api/model-info", json!({ "model_id": SURFING })),
    )
    .await;
    let info: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        info,
        json!({
            "base_model": "CompVis/stable-diffusion-v1-4",
            "training_prompt": "A man is surfing"
        })
    );

    let (status, body) = send(
        &app,
        post_json("/api/model-info", json!({ "model_id": "ghost/model" })),
    )
    .await;
    let info: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info, json!({ "base_model": "", "training_prompt": "" }));
    assert_eq!(h.registry.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn generate_returns_a_playable_video_url() {
    let h = harness();
    let app = router(h.state.clone());

    let (status, body) = send(&app, post_json("/api/generate", panda())).await;
    assert_eq!(status, StatusCode::OK);
    let output: Value = serde_json::from_slice(&body).unwrap();
    let url = output["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/videos/"));

    let (status, video) = send(&app, get(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(video, b"A panda is surfing.|3");

    let seen = h.pipeline.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        serde_json::from_value::<GenerationRequest>(panda()).unwrap()
    );
}

#[tokio::test]
async fn out_of_range_values_are_rejected() {
    let h = harness();
    let app = router(h.state.clone());

    for (field, value) in [
        ("video_length", json!(3)),
        ("video_length", json!(13)),
        ("fps", json!(0)),
        ("seed", json!(100_001)),
        ("num_steps", json!(101)),
        ("guidance_scale", json!(50.1)),
    ] {
        let mut request = panda();
        request[field] = value;
        let (status, _) = send(&app, post_json("/api/generate", request)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{field}");
    }

    let mut request = panda();
    request["model_id"] = json!("someone/else");
    let (status, _) = send(&app, post_json("/api/generate", request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(h.pipeline.seen().is_empty());
}

#[tokio::test]
async fn generation_failure_shows_a_generic_error() {
    let h = harness_with(true, None);
    let app = router(h.state.clone());

    let (status, body) = send(&app, post_json("/api/generate", panda())).await;
    let error: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error, json!({ "error": GENERATION_FAILED }));
}

#[tokio::test]
async fn examples_are_listed_and_replayable() {
    let h = harness();
    let app = router(h.state.clone());

    let (status, body) = send(&app, get("/api/examples")).await;
    let examples: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(examples.len(), 10);
    assert_eq!(examples[0], panda());

    let (status, _) = send(&app, post_empty("/api/examples/0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.pipeline.seen()[0].prompt, "A panda is surfing.");

    let (status, _) = send(&app, post_empty("/api/examples/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_get_their_own_videos() {
    let h = harness();
    let app = router(h.state.clone());

    let requests: Vec<Value> = (0..6u32)
        .map(|i| {
            let mut request = panda();
            request["prompt"] = json!(format!("session {i}"));
            request["seed"] = json!(i * 7);
            request
        })
        .collect();

    let responses = futures::future::join_all(requests.iter().map(|request| {
        let app = app.clone();
        let request = request.clone();
        async move {
            let (status, body) = send(&app, post_json("/api/generate", request)).await;
            assert_eq!(status, StatusCode::OK);
            let output: Value = serde_json::from_slice(&body).unwrap();
            let url = output["url"].as_str().unwrap().to_string();
            send(&app, get(&url)).await.1
        }
    }))
    .await;

    for (request, video) in requests.iter().zip(responses) {
        let expected = format!(
            "{}|{}",
            request["prompt"].as_str().unwrap(),
            request["seed"]
        );
        assert_eq!(String::from_utf8(video).unwrap(), expected);
    }
}

#[tokio::test]
async fn health_and_queue_status() {
    let h = harness();
    let app = router(h.state.clone());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!((status, body.as_slice()), (StatusCode::OK, &b"ok"[..]));

    let (status, body) = send(&app, get("/api/queue")).await;
    let queue: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue, json!({ "waiting": 0, "running": 0, "workers": 1 }));
}
