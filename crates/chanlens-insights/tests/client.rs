//! Integration tests for `InsightsClient` using wiremock HTTP mocks.

use chanlens_core::{process_all, AnalyticsInput, AnalyticsOutput};
use chanlens_insights::{InsightsClient, InsightsError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> InsightsClient {
    InsightsClient::with_base_url("test-key", "test-model", 30, &server.uri())
        .expect("client construction should not fail")
}

fn analytics() -> AnalyticsOutput {
    let input = AnalyticsInput::from_json(
        r#"{
            "channel": {
                "channel_id": "UCa", "channel_name": "Alpha",
                "period_videos": [
                    {"video_id": "a1", "title": "Alpha One", "published_at": "2026-01-10T00:00:00Z", "views": 500}
                ],
                "baseline_videos": []
            },
            "competitors": []
        }"#,
    )
    .expect("fixture should parse");
    process_all(&input)
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    }))
}

#[tokio::test]
async fn comparative_reply_is_completed_from_prefill() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "max_tokens": 4096
        })))
        .respond_with(reply(
            r#""overview": "Alpha stands alone.", "key_trends": ["t1"], "content_gaps": [], "top_performer_note": "500 views"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = test_client(&server)
        .generate_comparative(&analytics(), "ctx")
        .await
        .expect("should parse comparative analysis");

    assert_eq!(analysis.overview, "Alpha stands alone.");
    assert_eq!(analysis.key_trends, vec!["t1".to_string()]);
    assert_eq!(analysis.top_performer_note, "500 views");
}

#[tokio::test]
async fn takeaways_are_capped_at_three() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(reply(r#""one", "two", "three", "four"]"#))
        .mount(&server)
        .await;

    let takeaways = test_client(&server)
        .generate_takeaways(&analytics(), "ctx", &Default::default())
        .await
        .expect("should parse takeaways");

    assert_eq!(takeaways, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate_comparative(&analytics(), "ctx")
        .await
        .unwrap_err();

    assert!(
        matches!(err, InsightsError::Api { status: 401, ref message } if message == "invalid x-api-key"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn empty_content_is_an_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate_takeaways(&analytics(), "ctx", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::EmptyResponse(ref label) if label == "takeaways"), "got {err:?}");
}

#[tokio::test]
async fn prose_reply_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(reply("Sure! Here are some ideas."))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate_video_ideas(&analytics(), "ctx", &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn generate_insights_runs_three_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(serde_json::json!({"temperature": 0.5})))
        .respond_with(reply(
            r#"{"title": "Idea A", "title_variations": ["a"], "hooks": ["h"], "topic": "t"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(serde_json::json!({"messages": [{"role": "user"}, {"role": "assistant", "content": "{"}]})))
        .respond_with(reply(r#""overview": "o"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(serde_json::json!({"temperature": 0.3})))
        .respond_with(reply(r#""only takeaway"]"#))
        .expect(1)
        .mount(&server)
        .await;

    let insights = test_client(&server)
        .generate_insights(&analytics())
        .await
        .expect("all three requests should succeed");

    assert_eq!(insights.comparative_analysis.overview, "o");
    assert_eq!(insights.video_ideas.len(), 1);
    assert_eq!(insights.video_ideas[0].title, "Idea A");
    assert_eq!(insights.takeaways, vec!["only takeaway"]);
}
