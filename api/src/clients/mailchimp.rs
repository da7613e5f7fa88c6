//! Mailing-list client
//! Subscribes addresses through the Mailchimp v2 `lists/subscribe` call

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MailchimpConfig;

#[derive(Error, Debug)]
pub enum MailingListError {
    #[error("Mailing-list API is not configured")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Network timeout")]
    Timeout,
    #[error("Mailing-list API returned error: {message}")]
    Api { message: String, response: Value },
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl MailingListError {
    /// What the debug envelope shows for this failure
    pub fn debug_payload(&self) -> Value {
        match self {
            MailingListError::Api { response, .. } => response.clone(),
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// One subscription call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribeRequest {
    pub list_id: String,
    pub email: String,
    pub merge_vars: Map<String, Value>,
    pub double_optin: bool,
    pub update_existing: bool,
    pub replace_interests: bool,
    pub send_welcome: bool,
}

#[async_trait]
pub trait MailingListClient: Send + Sync {
    /// Subscribe an address. `Ok` carries the API's response body.
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<Value, MailingListError>;
}

pub struct MailchimpClient {
    api_key: Option<String>,
    api_url: Option<String>,
    client: reqwest::Client,
}

impl MailchimpClient {
    pub fn new(config: &MailchimpConfig, timeout: Duration) -> Self {
        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        MailchimpClient {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            client,
        }
    }

    fn is_error_response(body: &Value) -> bool {
        body.get("status").and_then(Value::as_str) == Some("error") || body.get("error").is_some()
    }
}

#[async_trait]
impl MailingListClient for MailchimpClient {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<Value, MailingListError> {
        let (Some(api_key), Some(api_url)) = (&self.api_key, &self.api_url) else {
            return Err(MailingListError::NotConfigured);
        };

        let url = format!("{}/lists/subscribe.json", api_url);
        debug!(list_id = %request.list_id, "Subscribing address via {}", url);

        let payload = json!({
            "apikey": api_key,
            "id": request.list_id,
            "email": { "email": request.email },
            "merge_vars": request.merge_vars,
            "double_optin": request.double_optin,
            "update_existing": request.update_existing,
            "replace_interests": request.replace_interests,
            "send_welcome": request.send_welcome,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailingListError::Timeout
                } else {
                    MailingListError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MailingListError::InvalidResponse(e.to_string()))?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(MailingListError::RequestFailed(format!("HTTP {}", status)));
            }
            Err(e) => return Err(MailingListError::InvalidResponse(e.to_string())),
        };

        if !status.is_success() || Self::is_error_response(&body) {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status));
            warn!(list_id = %request.list_id, %status, "Mailing-list API rejected subscription: {}", message);
            return Err(MailingListError::Api {
                message,
                response: body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SubscribeRequest {
        let mut merge_vars = Map::new();
        merge_vars.insert("FIRST".into(), json!("Jo"));
        SubscribeRequest {
            list_id: "list42".into(),
            email: "jo@acme.com".into(),
            merge_vars,
            double_optin: false,
            update_existing: true,
            replace_interests: false,
            send_welcome: false,
        }
    }

    fn client_for(server: &MockServer) -> MailchimpClient {
        MailchimpClient::new(
            &MailchimpConfig {
                api_key: Some("secret-us1".into()),
                api_url: Some(format!("{}/2.0", server.uri())),
            },
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_subscribe_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2.0/lists/subscribe.json"))
            .and(body_partial_json(json!({
                "apikey": "secret-us1",
                "id": "list42",
                "email": { "email": "jo@acme.com" },
                "merge_vars": { "FIRST": "Jo" },
                "update_existing": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "jo@acme.com",
                "euid": "abc",
                "leid": "123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = client_for(&server).subscribe(&request()).await.unwrap();
        assert_eq!(body["euid"], json!("abc"));
    }

    #[tokio::test]
    async fn test_subscribe_error_indicator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "status": "error",
                "code": 214,
                "name": "List_AlreadySubscribed",
                "error": "jo@acme.com is already subscribed to the list."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).subscribe(&request()).await.unwrap_err();
        match &err {
            MailingListError::Api { message, response } => {
                assert_eq!(message, "jo@acme.com is already subscribed to the list.");
                assert_eq!(response["code"], json!(214));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.debug_payload()["name"], json!("List_AlreadySubscribed"));
    }

    #[tokio::test]
    async fn test_error_key_in_ok_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "Invalid API key" })))
            .mount(&server)
            .await;

        let err = client_for(&server).subscribe(&request()).await.unwrap_err();
        assert!(matches!(err, MailingListError::Api { .. }));
    }

    #[tokio::test]
    async fn test_non_json_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).subscribe(&request()).await.unwrap_err();
        assert!(matches!(err, MailingListError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_not_configured() {
        let client = MailchimpClient::new(&MailchimpConfig::default(), Duration::from_secs(1));
        let err = client.subscribe(&request()).await.unwrap_err();
        assert!(matches!(err, MailingListError::NotConfigured));
        assert_eq!(
            err.debug_payload(),
            json!({ "error": "Mailing-list API is not configured" })
        );
    }
}
