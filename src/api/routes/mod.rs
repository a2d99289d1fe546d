pub mod health;
pub mod qa;

use axum::http::{header, HeaderValue};
use axum::{middleware, routing::get, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::{middleware::request_logger, state::AppState};

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Every path answers `OPTIONS` (preflight). `/health` takes `GET`, every
/// other path takes `POST` (ask).
pub fn create_router(state: AppState) -> Router {
    let allow_origin = cors_origin(&state.config.config.cors.allow_origin);
    let qa_routes = post(qa::ask).options(qa::preflight);

    Router::new()
        .route(
            "/health",
            get(health::health_check).options(qa::preflight),
        )
        .route("/", qa_routes.clone())
        .route("/{*path}", qa_routes)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    allow_origin,
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOW_METHODS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOW_HEADERS),
                )),
        )
        .with_state(state)
}

fn cors_origin(origin: &str) -> HeaderValue {
    HeaderValue::from_str(origin).unwrap_or_else(|_| {
        tracing::warn!(origin, "invalid CORS origin, allowing any");
        HeaderValue::from_static("*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fakes::{self, CallLog, FakeVectorStore};
    use crate::domain::{DomainError, RetrievedDocument};
    use crate::infrastructure::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router(log: &CallLog, replies: Vec<Result<String, DomainError>>) -> Router {
        let store = FakeVectorStore::new(log, vec![RetrievedDocument::new("Spring docs")]);
        let state = AppState::new(fakes::pipeline(log, replies, store), AppConfig::default());
        create_router(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn assert_cors(response: &Response<Body>) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    async fn test_preflight() {
        let log = CallLog::default();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = router(&log, vec![]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert!(body_bytes(response).await.is_empty());
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_preflight_on_any_path() {
        for uri in ["/anything/else", "/health"] {
            let log = CallLog::default();
            let request = Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .body(Body::empty())
                .unwrap();

            let response = router(&log, vec![]).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_cors(&response);
            assert!(body_bytes(response).await.is_empty(), "{uri}");
            assert!(log.calls().is_empty(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_ask_returns_json_string() {
        let log = CallLog::default();
        let app = router(
            &log,
            vec![
                Ok("What is this website about?".to_string()),
                Ok("It is about \"Cloud Native Spring\".".to_string()),
            ],
        );

        let response = app
            .oneshot(post_json(
                "/",
                r#"{"question": "What is this site about?", "conversationHistory": []}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!("It is about \"Cloud Native Spring\"."));
        assert_eq!(log.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_ask_on_any_path_without_content_type() {
        let log = CallLog::default();
        let app = router(&log, vec![Ok("standalone".into()), Ok("answer".into())]);
        let request = Request::builder()
            .method("POST")
            .uri("/api/ask")
            .body(Body::from(r#"{"question": "hi"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"\"answer\"");
    }

    #[tokio::test]
    async fn test_null_history_is_empty_history() {
        let log = CallLog::default();
        let app = router(&log, vec![Ok("standalone".into()), Ok("answer".into())]);

        let response = app
            .oneshot(post_json(
                "/",
                r#"{"question": "hi", "conversationHistory": null}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(log.prompts()[0].contains("conversation history: \n"));
    }

    #[tokio::test]
    async fn test_history_reaches_prompts() {
        let log = CallLog::default();
        let app = router(&log, vec![Ok("standalone".into()), Ok("answer".into())]);

        app.oneshot(post_json(
            "/",
            r#"{"question": "How do I install it?",
                "conversationHistory": ["Tell me about X", "X is a framework"]}"#,
        ))
        .await
        .unwrap();

        for prompt in log.prompts() {
            assert!(prompt.contains("Human: Tell me about X\nExpert: X is a framework"));
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let log = CallLog::default();

        let response = router(&log, vec![])
            .oneshot(post_json("/", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["kind"], "invalid_request");
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_question_is_bad_request() {
        let log = CallLog::default();

        let response = router(&log, vec![])
            .oneshot(post_json("/", r#"{"conversationHistory": ["hi"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(log.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_history_type_is_bad_request() {
        let log = CallLog::default();

        let response = router(&log, vec![])
            .oneshot(post_json(
                "/",
                r#"{"question": "hi", "conversationHistory": "not a list"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_unavailable_maps_to_503() {
        let log = CallLog::default();
        let app = router(&log, vec![Err(DomainError::unavailable("rate limited"))]);

        let response = app
            .oneshot(post_json("/", r#"{"question": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_cors(&response);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["kind"], "provider_unavailable");
        assert_eq!(log.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_502() {
        let log = CallLog::default();
        let app = router(
            &log,
            vec![Ok("standalone".into()), Err(DomainError::provider("bad completion"))],
        );

        let response = app
            .oneshot(post_json("/", r#"{"question": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["message"], "Provider error: bad completion");
    }

    #[tokio::test]
    async fn test_health() {
        let log = CallLog::default();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = router(&log, vec![]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_cors_origin_falls_back_on_invalid_value() {
        assert_eq!(cors_origin("https://example.com"), "https://example.com");
        assert_eq!(cors_origin("bad\norigin"), "*");
    }
}
