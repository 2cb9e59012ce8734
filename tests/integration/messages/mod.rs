//! POST /message integration tests

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use parley_chat::domain::relay::PROVIDER_ERROR_REPLY;
use parley_llm::{LlmRole, MockLlmService, MockOutcome};

use crate::common::{parse_body, post_message, post_raw, ChatTestApp};

mod test_send_message {
    use super::*;

    #[tokio::test]
    async fn test_echo_mode_example_exchange() {
        let app = ChatTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(post_message(json!({"text": "hi"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["aiMessage"]["role"], "assistant");
        assert_eq!(body["aiMessage"]["text"], "Echo (no key): hi");

        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["role"], "user");
        assert_eq!(history[0]["text"], "hi");
        assert_eq!(history[1], body["aiMessage"]);
    }

    #[tokio::test]
    async fn test_message_shape_has_id_and_created_at() {
        let app = ChatTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(post_message(json!({"text": "shape"})))
            .await
            .unwrap();
        let body = parse_body(resp).await;

        let msg = &body["aiMessage"];
        assert!(msg["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(msg["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_each_submit_grows_history_by_two() {
        let app = ChatTestApp::new().await.unwrap();

        for expected in [2usize, 4, 6] {
            let resp = app
                .test_router()
                .oneshot(post_message(json!({"text": "again"})))
                .await
                .unwrap();
            let body = parse_body(resp).await;
            assert_eq!(body["history"].as_array().unwrap().len(), expected);
        }
    }

    #[tokio::test]
    async fn test_provider_reply_is_recorded() {
        let mock = MockLlmService::with_outcome(MockOutcome::FixedReply("Hi there!".to_string()));
        let app = ChatTestApp::with_provider(mock.clone()).await.unwrap();

        let resp = app
            .test_router()
            .oneshot(post_message(json!({"text": "hello"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["aiMessage"]["text"], "Hi there!");

        let recorded = mock.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].messages[0].role, LlmRole::System);
        assert_eq!(recorded[0].messages[1].content, "hello");
    }

    #[tokio::test]
    async fn test_provider_failure_still_returns_200() {
        let mock = MockLlmService::with_outcome(MockOutcome::Fail);
        let app = ChatTestApp::with_provider(mock).await.unwrap();

        let resp = app
            .test_router()
            .oneshot(post_message(json!({"text": "hello"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["aiMessage"]["text"], PROVIDER_ERROR_REPLY);
        assert_eq!(body["history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_timeout_still_returns_200() {
        let mock = MockLlmService::new();
        mock.behavior().set_delay_ms(2_000);
        let app = ChatTestApp::with_provider_timeout(mock, Duration::from_millis(50))
            .await
            .unwrap();

        let resp = app
            .test_router()
            .oneshot(post_message(json!({"text": "slow"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body["aiMessage"]["text"], PROVIDER_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_concurrent_posts_keep_every_message() {
        let app = ChatTestApp::new().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = app.test_router();
                tokio::spawn(async move {
                    router
                        .oneshot(post_message(json!({"text": format!("q{}", i)})))
                        .await
                        .unwrap()
                        .status()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::OK);
        }

        assert_eq!(app.store.read_all().await.unwrap().len(), 16);
    }
}

mod test_invalid_input {
    use super::*;

    async fn assert_rejected(app: &ChatTestApp, req: axum::http::Request<axum::body::Body>) -> Value {
        let resp = app.test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        parse_body(resp).await
    }

    #[tokio::test]
    async fn test_missing_text_returns_400() {
        let app = ChatTestApp::new().await.unwrap();
        let body = assert_rejected(&app, post_message(json!({}))).await;
        assert_eq!(body, json!({"error": "text is required"}));
    }

    #[tokio::test]
    async fn test_empty_text_returns_400() {
        let app = ChatTestApp::new().await.unwrap();
        let body = assert_rejected(&app, post_message(json!({"text": ""}))).await;
        assert_eq!(body, json!({"error": "text is required"}));
    }

    #[tokio::test]
    async fn test_blank_text_returns_400() {
        let app = ChatTestApp::new().await.unwrap();
        let body = assert_rejected(&app, post_message(json!({"text": "   "}))).await;
        assert_eq!(body["error"], "text is required");
    }

    #[tokio::test]
    async fn test_non_string_text_returns_400() {
        let app = ChatTestApp::new().await.unwrap();
        for text in [json!(42), json!(true), json!({"nested": "x"}), Value::Null] {
            let body = assert_rejected(&app, post_message(json!({"text": text}))).await;
            assert_eq!(body["error"], "text is required");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = ChatTestApp::new().await.unwrap();
        let body = assert_rejected(&app, post_raw("{not json")).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_rejections_append_nothing() {
        let app = ChatTestApp::new().await.unwrap();

        assert_rejected(&app, post_message(json!({"text": ""}))).await;
        assert_rejected(&app, post_message(json!({"text": 7}))).await;
        assert_rejected(&app, post_raw("nope")).await;

        assert!(app.store.read_all().await.unwrap().is_empty());
    }
}

mod test_persistence_failure {
    use super::*;

    #[tokio::test]
    async fn test_unwritable_log_returns_500() {
        let app = ChatTestApp::new().await.unwrap();
        std::fs::remove_file(app.data_file()).unwrap();
        std::fs::create_dir(app.data_file()).unwrap();

        let resp = app
            .test_router()
            .oneshot(post_message(json!({"text": "hi"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = parse_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Persistence"));
    }
}
