//! Integration tests for the submit→poll flow and the API client, run
//! against an in-process axum mock backend with request counters.
//!
//! Poll timings are shrunk to tens of milliseconds so the full lifecycle
//! (queued → waiting → done / timeout) plays out in real time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

use genbox_proto::api::{ApiClient, ApiError};
use genbox_proto::catalog::MediaKind;
use genbox_proto::job::GenerationRequest;
use genbox_proto::poll::{spawn_generation, JobRegistry, JobUpdate, PollSettings};

// ── Harness ───────────────────────────────────────────────────────────────────

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn fast_settings() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(25),
        timeout: Duration::from_secs(60),
    }
}

fn prompt_request() -> GenerationRequest {
    GenerationRequest::Prompt {
        model: "model-1".to_string(),
        prompt: "a lighthouse at dusk".to_string(),
    }
}

async fn next_update(rx: &mut mpsc::Receiver<(MediaKind, JobUpdate)>) -> JobUpdate {
    let (_, update) = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for job update")
        .expect("update channel closed early");
    update
}

// ── Poll flow ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn immediate_done_skips_polling() {
    let result_calls = Arc::new(AtomicUsize::new(0));
    let rc = result_calls.clone();

    let router = Router::new()
        .route(
            "/api/image/submit",
            post(|| async { Json(json!({"status": "done", "url": "https://cdn/img.png"})) }),
        )
        .route(
            "/api/image/result/:job_id",
            get(move |_: Path<String>| {
                let rc = rc.clone();
                async move {
                    rc.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"status": "pending"}))
                }
            }),
        );
    let base = serve(router).await;

    let (tx, mut rx) = mpsc::channel(16);
    spawn_generation(
        ApiClient::new(base),
        MediaKind::Image,
        prompt_request(),
        fast_settings(),
        tx,
    );

    assert_eq!(
        next_update(&mut rx).await,
        JobUpdate::Done {
            url: "https://cdn/img.png".to_string()
        }
    );
    // The task is finished; the channel must close without further updates.
    assert!(rx.recv().await.is_none());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(result_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn queued_job_polls_until_done() {
    let result_calls = Arc::new(AtomicUsize::new(0));
    let rc = result_calls.clone();

    let router = Router::new()
        .route(
            "/api/video/submit",
            post(|| async { Json(json!({"status": "queued", "job_id": "job-1"})) }),
        )
        .route(
            "/api/video/result/:job_id",
            get(move |Path(job_id): Path<String>| {
                let rc = rc.clone();
                async move {
                    assert_eq!(job_id, "job-1");
                    let nth = rc.fetch_add(1, Ordering::SeqCst) + 1;
                    if nth >= 3 {
                        Json(json!({"status": "done", "url": "https://cdn/clip.mp4"}))
                    } else {
                        Json(json!({"status": "pending"}))
                    }
                }
            }),
        );
    let base = serve(router).await;

    let (tx, mut rx) = mpsc::channel(16);
    spawn_generation(
        ApiClient::new(base),
        MediaKind::Video,
        prompt_request(),
        fast_settings(),
        tx,
    );

    assert_eq!(
        next_update(&mut rx).await,
        JobUpdate::Queued {
            job_id: "job-1".to_string()
        }
    );
    for _ in 0..2 {
        match next_update(&mut rx).await {
            JobUpdate::Waiting { status, url, .. } => {
                assert_eq!(status, "pending");
                assert!(url.is_none());
            }
            other => panic!("expected Waiting, got {other:?}"),
        }
    }
    assert_eq!(
        next_update(&mut rx).await,
        JobUpdate::Done {
            url: "https://cdn/clip.mp4".to_string()
        }
    );
    assert_eq!(result_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn submit_failure_reports_error_and_never_polls() {
    let result_calls = Arc::new(AtomicUsize::new(0));
    let rc = result_calls.clone();

    let router = Router::new()
        .route(
            "/api/image/submit",
            post(|| async { (StatusCode::BAD_GATEWAY, "provider exploded") }),
        )
        .route(
            "/api/image/result/:job_id",
            get(move |_: Path<String>| {
                let rc = rc.clone();
                async move {
                    rc.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"status": "pending"}))
                }
            }),
        );
    let base = serve(router).await;

    let (tx, mut rx) = mpsc::channel(16);
    spawn_generation(
        ApiClient::new(base),
        MediaKind::Image,
        prompt_request(),
        fast_settings(),
        tx,
    );

    match next_update(&mut rx).await {
        JobUpdate::Failed { message } => assert!(message.contains("provider exploded")),
        other => panic!("expected Failed, got {other:?}"),
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(result_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submit_without_job_id_fails() {
    let router = Router::new().route(
        "/api/music/submit",
        post(|| async { Json(json!({"status": "queued"})) }),
    );
    let base = serve(router).await;

    let (tx, mut rx) = mpsc::channel(16);
    spawn_generation(
        ApiClient::new(base),
        MediaKind::Music,
        GenerationRequest::Song {
            model: "song-model".to_string(),
            lyrics: "verse one".to_string(),
            style: "ambient".to_string(),
        },
        fast_settings(),
        tx,
    );

    match next_update(&mut rx).await {
        JobUpdate::Failed { message } => assert!(message.contains("neither a result url")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_stops_polling() {
    let result_calls = Arc::new(AtomicUsize::new(0));
    let rc = result_calls.clone();

    let router = Router::new()
        .route(
            "/api/image/submit",
            post(|| async { Json(json!({"status": "queued", "job_id": "slow-job"})) }),
        )
        .route(
            "/api/image/result/:job_id",
            get(move |_: Path<String>| {
                let rc = rc.clone();
                async move {
                    rc.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"status": "generating"}))
                }
            }),
        );
    let base = serve(router).await;

    let settings = PollSettings {
        interval: Duration::from_millis(20),
        timeout: Duration::from_millis(90),
    };
    let (tx, mut rx) = mpsc::channel(32);
    spawn_generation(
        ApiClient::new(base),
        MediaKind::Image,
        prompt_request(),
        settings,
        tx,
    );

    loop {
        match next_update(&mut rx).await {
            JobUpdate::TimedOut => break,
            JobUpdate::Queued { .. } | JobUpdate::Waiting { .. } => {}
            other => panic!("unexpected update {other:?}"),
        }
    }

    // Terminal means terminal: the counter must not move again.
    let frozen = result_calls.load(Ordering::SeqCst);
    assert!(frozen >= 1);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(result_calls.load(Ordering::SeqCst), frozen);
}

#[tokio::test]
async fn resubmission_aborts_previous_poll() {
    let submits = Arc::new(AtomicUsize::new(0));
    let per_job: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));

    let sc = submits.clone();
    let pj = per_job.clone();
    let router = Router::new()
        .route(
            "/api/video/submit",
            post(move || {
                let sc = sc.clone();
                async move {
                    let n = sc.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(json!({"status": "queued", "job_id": format!("job-{n}")}))
                }
            }),
        )
        .route(
            "/api/video/result/:job_id",
            get(move |Path(job_id): Path<String>| {
                let pj = pj.clone();
                async move {
                    let mut map = pj.lock().unwrap();
                    *map.entry(job_id.clone()).or_insert(0) += 1;
                    // The first job never finishes; the second finishes at once.
                    if job_id == "job-2" {
                        Json(json!({"status": "done", "url": "https://cdn/second.mp4"}))
                    } else {
                        Json(json!({"status": "pending"}))
                    }
                }
            }),
        );
    let base = serve(router).await;
    let api = ApiClient::new(base);

    let mut registry = JobRegistry::new();

    let (tx1, mut rx1) = mpsc::channel(16);
    let handle =
        spawn_generation(api.clone(), MediaKind::Video, prompt_request(), fast_settings(), tx1);
    registry.replace(MediaKind::Video, handle);
    assert!(matches!(
        next_update(&mut rx1).await,
        JobUpdate::Queued { .. }
    ));
    assert!(registry.is_running(MediaKind::Video));

    // Resubmit: the registry must abort job-1's poller before job-2 starts.
    let (tx2, mut rx2) = mpsc::channel(16);
    let handle =
        spawn_generation(api.clone(), MediaKind::Video, prompt_request(), fast_settings(), tx2);
    registry.replace(MediaKind::Video, handle);

    loop {
        match next_update(&mut rx2).await {
            JobUpdate::Done { url } => {
                assert_eq!(url, "https://cdn/second.mp4");
                break;
            }
            JobUpdate::Queued { .. } | JobUpdate::Waiting { .. } => {}
            other => panic!("unexpected update {other:?}"),
        }
    }

    // job-1's poller is dead: its per-job counter stops moving.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let frozen = per_job.lock().unwrap().get("job-1").copied().unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(120)).await;
    let after = per_job.lock().unwrap().get("job-1").copied().unwrap_or(0);
    assert_eq!(after, frozen);
}

// ── API client ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_round_trip() {
    let router = Router::new().route(
        "/api/chat",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["model"], "chat-model");
            assert_eq!(body["message"], "hello");
            Json(json!({"text": "hi there"}))
        }),
    );
    let base = serve(router).await;

    let reply = ApiClient::new(base)
        .chat("chat-model", "hello")
        .await
        .unwrap();
    assert_eq!(reply.text.as_deref(), Some("hi there"));
}

#[tokio::test]
async fn models_and_me_round_trip() {
    let router = Router::new()
        .route(
            "/api/models",
            get(|| async {
                Json(json!({
                    "chat": [{"id": "c1", "title": "Chat One"}],
                    "image": [{"id": "i1"}, {"id": "i2"}]
                }))
            }),
        )
        .route(
            "/api/me",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("tg_id").map(String::as_str), Some("42"));
                Json(json!({"tg_id": 42, "free_credits": 2.0, "pro_credits": 0.0}))
            }),
        );
    let base = serve(router).await;
    let api = ApiClient::new(base);

    let catalog = api.models().await.unwrap();
    assert_eq!(catalog.chat.len(), 1);
    assert_eq!(catalog.image.len(), 2);
    assert!(catalog.video.is_empty());
    assert!(catalog.music.is_empty());

    let me = api.me(42).await.unwrap();
    assert_eq!(me.tg_id, 42);
    assert_eq!(me.free_credits, 2.0);
}

#[tokio::test]
async fn error_message_comes_from_response_body() {
    let router = Router::new()
        .route(
            "/api/me",
            get(|| async { (StatusCode::NOT_FOUND, "user not found") }),
        )
        .route(
            "/api/chat",
            post(|| async {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(json!({"ok": false, "error": "no_credits"})),
                )
            }),
        );
    let base = serve(router).await;
    let api = ApiClient::new(base);

    // Plain-text body: the message is the body, verbatim.
    match api.me(1).await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "user not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    // JSON body: the message is the serialized JSON.
    match api.chat("m", "hi").await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 402);
            assert!(message.contains("no_credits"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
