//! HTTP-level tests for the form endpoint.
//!
//! The router is driven in-process with `oneshot`; outbound clients are
//! counting stand-ins so no network is involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api::clients::{MailError, MailTransport, MailingListClient, MailingListError, OutboundEmail, SubscribeRequest};
use api::config::{FormsConfig, ServerConfig};
use api::dispatch::Dispatcher;
use api::metrics;
use api::routes::build_router;
use api::state::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use prometheus::Registry;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct StubList {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl MailingListClient for StubList {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<Value, MailingListError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(MailingListError::Api {
                message: "Invalid list".into(),
                response: json!({ "status": "error", "code": 200, "error": "Invalid list" }),
            })
        } else {
            Ok(json!({ "email": request.email, "euid": "e1", "leid": "l1" }))
        }
    }
}

#[derive(Default)]
struct StubMail {
    sent: std::sync::Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl MailTransport for StubMail {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    list: Arc<StubList>,
    mail: Arc<StubMail>,
}

fn build_test_app(forms: FormsConfig, list_fails: bool) -> TestApp {
    let registry = Registry::new_custom(Some("test".into()), None).unwrap();
    metrics::register_all(&registry).unwrap();

    let list = Arc::new(StubList {
        fail: list_fails,
        ..Default::default()
    });
    let mail = Arc::new(StubMail::default());
    let dispatcher = Dispatcher::with_clients(forms, list.clone(), mail.clone());

    let server = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        allowed_origins: vec![],
    };
    let router = build_router(AppState::new(dispatcher, registry), &server);
    TestApp { router, list, mail }
}

async fn post_form(router: &Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/ajax")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const VALID_ENQUIRY: &str = "action=enquiries&name=Jo+Bloggs&org=Acme&email=jo%40acme.com\
&phone=0400+000+000&comments=Line+one%0ALine+two&how=Search";

#[tokio::test]
async fn enquiry_succeeds_and_sends_email() {
    let app = build_test_app(FormsConfig::default(), false);

    let (status, body) = post_form(&app.router, VALID_ENQUIRY).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "isError": false, "messages": ["Submission successful."], "data": {} })
    );
    let sent = app.mail.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "enquiries@localhost");
    assert!(sent[0].body.contains("<p><strong>comments</strong>: <br>Line one\nLine two</p>"));
    assert_eq!(app.list.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_action_is_reported() {
    let app = build_test_app(FormsConfig::default(), false);

    let (status, body) = post_form(&app.router, "name=Jo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isError"], json!(true));
    assert_eq!(body["messages"], json!(["Action not provided."]));
}

#[tokio::test]
async fn unknown_action_is_reported() {
    let app = build_test_app(FormsConfig::default(), false);

    let (_, body) = post_form(&app.router, "action=foo").await;

    assert_eq!(body["messages"], json!(["Invalid action: foo."]));
}

#[tokio::test]
async fn empty_required_fields_report_every_message() {
    let app = build_test_app(FormsConfig::default(), false);

    let (_, body) = post_form(
        &app.router,
        "action=enquiries&name=&org=&email=&phone=&comments=&how=",
    )
    .await;

    assert_eq!(body["isError"], json!(true));
    assert_eq!(
        body["messages"],
        json!([
            "Please enter your name.",
            "Please enter the name of your organisation.",
            "Please enter your email address.",
            "Please enter your phone number."
        ])
    );
    assert!(app.mail.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn absent_field_is_reported_by_name() {
    let app = build_test_app(FormsConfig::default(), false);

    let (_, body) = post_form(
        &app.router,
        "action=elink&email=jo%40acme.com&first=Jo&last=Bloggs",
    )
    .await;

    assert_eq!(body["messages"], json!(["Field not provided: org."]));
    assert_eq!(app.list.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn undecodable_body_gets_generic_error() {
    let app = build_test_app(FormsConfig::default(), false);

    let request = Request::builder()
        .method("POST")
        .uri("/ajax")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["isError"], json!(true));
    assert_eq!(body["messages"], json!([FormsConfig::default().error_message]));
}

#[tokio::test]
async fn failed_subscription_is_silent_outside_debug() {
    let app = build_test_app(FormsConfig::default(), true);

    let (_, body) = post_form(
        &app.router,
        "action=elink&email=jo%40acme.com&first=Jo&last=&org=",
    )
    .await;

    assert_eq!(body, json!({ "isError": true, "messages": [], "data": {} }));
    assert_eq!(app.list.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn debug_mode_exposes_step_diagnostics() {
    let forms = FormsConfig {
        debug: true,
        ..FormsConfig::default()
    };
    let app = build_test_app(forms, true);

    let (_, body) = post_form(
        &app.router,
        "action=vetcommons&type=publisher&first=Jo&last=Bloggs&email=jo%40acme.com\
&org=Acme&phone=0400&website=https%3A%2F%2Facme.com",
    )
    .await;

    assert_eq!(body["isError"], json!(true));
    assert_eq!(body["messages"], json!(["Error while subscribing to the mailing list."]));
    assert_eq!(body["data"]["values"]["website"], json!("https://acme.com"));
    assert_eq!(body["data"]["mailchimp"]["error"], json!("Invalid list"));
    assert!(body["data"].get("email").is_none());
    assert!(app.mail.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn health_and_metrics_endpoints() {
    let app = build_test_app(FormsConfig::default(), false);
    post_form(&app.router, VALID_ENQUIRY).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], json!("ok"));

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("test_submissions_total"));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = build_test_app(FormsConfig::default(), false);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-correlation-id"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], json!("RouteNotFound"));
}
