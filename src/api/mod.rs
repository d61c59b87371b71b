//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/next", post(next_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/reset", post(reset_stats_handler))
        .route("/history", get(history_handler))
        .route("/history/remark", put(identity_remark_handler))
        .route("/history/:id/remark", put(remark_handler))
        .route("/export", get(export_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::{Command, Settings},
        testing::Harness,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    fn router_with_state() -> (Router, Arc<AppState>) {
        let harness = Harness::new(Settings::default());
        let (tx, _) = broadcast::channel(16);
        let state = Arc::new(AppState::new(harness.machine, tx, 25250, "127.0.0.1".to_string()));
        (create_router(Arc::clone(&state)), state)
    }

    fn router() -> Router {
        router_with_state().0
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn health() {
        let router = router();
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn start_and_pause() {
        let router = router();
        let (status, body) = send(&router, Method::POST, "/timer/start", None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "running");
        assert_eq!(body["timer"]["phase"], "focus");
        assert_eq!(body["timer"]["display"], "25:00");

        let (_, body) = send(&router, Method::POST, "/timer/pause", None).await;
        assert_eq!(json_body(&body)["timer"]["running"], false);

        let (_, body) = send(&router, Method::GET, "/status", None).await;
        assert_eq!(json_body(&body)["last_action"], "pause");
    }

    #[tokio::test]
    async fn next_moves_to_break() {
        let router = router();
        send(&router, Method::POST, "/timer/start", None).await;
        let (_, body) = send(&router, Method::POST, "/timer/next", None).await;
        let body = json_body(&body);
        assert_eq!(body["timer"]["phase"], "shortBreak");
        assert_eq!(body["timer"]["remainingSeconds"], 300);
    }

    #[tokio::test]
    async fn settings_round_trip_and_validation() {
        let router = router();
        let (_, body) = send(&router, Method::GET, "/settings", None).await;
        let mut settings = json_body(&body);
        assert_eq!(settings["focusMinutes"], 25);

        settings["focusMinutes"] = json!(40);
        let (status, body) = send(&router, Method::PUT, "/settings", Some(settings.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["focusMinutes"], 40);

        let (_, body) = send(&router, Method::GET, "/status", None).await;
        assert_eq!(json_body(&body)["timer"]["remainingSeconds"], 2400);

        settings["longBreakInterval"] = json!(0);
        let (status, body) = send(&router, Method::PUT, "/settings", Some(settings)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].as_str().unwrap().contains("longBreakInterval"));
    }

    #[tokio::test]
    async fn empty_export_is_no_content() {
        let router = router();
        let (status, body) = send(&router, Method::GET, "/export", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn stats_reset_requires_confirmation() {
        let router = router();
        let (status, _) = send(&router, Method::POST, "/stats/reset", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&router, Method::POST, "/stats/reset", Some(json!({"confirm": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["totalPomodoros"], 0);
    }

    #[tokio::test]
    async fn remark_for_unknown_record_is_not_found() {
        let router = router();
        let (status, _) = send(&router, Method::PUT, "/history/9/remark", Some(json!({"remark": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &router,
            Method::PUT,
            "/history/remark",
            Some(json!({
                "date": "2026-10-16",
                "startTime": "09:00",
                "endTime": "09:25",
                "focusMinutes": 25,
                "remark": "x"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn identity_remark_accepts_times_as_shown() {
        let (router, state) = router_with_state();
        state
            .with_machine(|machine| {
                machine.update_settings(Settings {
                    use_24h_format: false,
                    ..Settings::default()
                })
            })
            .unwrap()
            .unwrap();
        state.dispatch(Command::Start).unwrap();
        for _ in 0..60 {
            state.dispatch(Command::Tick).unwrap();
        }
        send(&router, Method::POST, "/timer/next", None).await;

        let (_, body) = send(&router, Method::GET, "/history", None).await;
        let mut shown = json_body(&body)[0].clone();
        assert!(shown["startTime"].as_str().unwrap().ends_with('M'));
        shown["remark"] = json!("echoed");

        let (status, _) = send(&router, Method::PUT, "/history/remark", Some(shown)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&router, Method::GET, "/history", None).await;
        assert_eq!(json_body(&body)[0]["remark"], "echoed");
    }

    #[tokio::test]
    async fn recorded_block_shows_in_history_stats_and_export() {
        let (router, state) = router_with_state();
        state.dispatch(Command::Start).unwrap();
        for _ in 0..90 {
            state.dispatch(Command::Tick).unwrap();
        }
        let (status, _) = send(&router, Method::POST, "/timer/next", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&router, Method::GET, "/history", None).await;
        let history = json_body(&body);
        let entries = history.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["focusMinutes"], 2);
        assert_eq!(entries[0]["id"], 1);

        let (status, _) = send(&router, Method::PUT, "/history/1/remark", Some(json!({"remark": "review | notes"}))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&router, Method::GET, "/stats", None).await;
        let stats = json_body(&body);
        assert_eq!(stats["totalFocusMinutes"], 2);
        assert_eq!(stats["totalPomodoros"], 0);

        let (status, body) = send(&router, Method::GET, "/export", None).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.ends_with("| 2 | review \\| notes |"), "{}", text);
    }
}
