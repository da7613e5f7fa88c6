use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shared::sanitizers::escape_for_display;
use shared::validators::validate_email;
use shared::{FieldKind, FieldRegistry, SanitisedValues, SubmissionSpec};
use tracing::{info, warn};

use super::{SideEffect, StepOutcome};
use crate::clients::{MailTransport, OutboundEmail};

/// Email the submitted values to the form's recipient
pub struct EmailNotify {
    transport: Arc<dyn MailTransport>,
}

impl EmailNotify {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }
}

/// One `<p>` per value, in declaration order. Multi-line fields start on
/// their own line.
pub fn build_body(values: &SanitisedValues, registry: &FieldRegistry) -> String {
    let mut body = String::new();
    for (field, value) in values.iter() {
        body.push_str("<p><strong>");
        body.push_str(&escape_for_display(field));
        body.push_str("</strong>: ");
        if registry.lookup(field).map(|def| def.kind) == Some(FieldKind::Textarea) {
            body.push_str("<br>");
        }
        body.push_str(&escape_for_display(value));
        body.push_str("</p>\n");
    }
    body
}

pub fn build_headers(from: &str, reply_to: &str) -> String {
    format!(
        "From: {}\r\nReply-To: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=UTF-8\r\n",
        from, reply_to
    )
}

#[async_trait]
impl SideEffect for EmailNotify {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn debug_key(&self) -> &'static str {
        "email"
    }

    fn failure_message(&self) -> &'static str {
        "Error while sending the email."
    }

    fn applies_to(&self, spec: &SubmissionSpec) -> bool {
        spec.email().is_some()
    }

    async fn apply(&self, values: &SanitisedValues, spec: &SubmissionSpec) -> StepOutcome {
        let Some(config) = spec.email() else {
            return StepOutcome::ok(None);
        };

        // Replies go to the visitor when they gave a usable address
        let reply_to = values
            .get("email")
            .filter(|email| validate_email(email).is_ok())
            .unwrap_or(config.from.as_str());

        let email = OutboundEmail {
            to: config.to.clone(),
            from: config.from.clone(),
            subject: config.subject.clone(),
            headers: build_headers(&config.from, reply_to),
            body: build_body(values, spec.registry()),
        };

        let debug = json!({
            "to": email.to,
            "subject": email.subject,
            "headers": email.headers,
            "body": email.body,
        });

        match self.transport.send(&email).await {
            Ok(()) => {
                info!(action = spec.action(), to = %email.to, "Notification email sent");
                StepOutcome::ok(Some(debug))
            }
            Err(e) => {
                warn!(action = spec.action(), to = %email.to, error = %e, "Notification email not delivered");
                StepOutcome::failed(Some(debug))
            }
        }
    }
}
