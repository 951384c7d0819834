use intrabar::services::{notify, DiscordNotifier, Notifier};
use intrabar::TraderError;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn discord_posts_content_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_json(json!({ "content": "SOXL BUY @ 31.25" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(format!("{}/webhook", server.uri()));
    notifier.send("SOXL BUY @ 31.25").await.unwrap();
}

#[tokio::test]
async fn discord_rejection_is_a_notify_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(format!("{}/webhook", server.uri()));
    let err = notifier.send("hello").await.unwrap_err();
    assert!(matches!(err, TraderError::Notify(ref m) if m.contains("400")));

    // The swallowing helper never surfaces the failure.
    notify(&notifier, "hello").await;
}
