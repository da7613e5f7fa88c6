use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use shared::{SanitisedValues, SubmissionSpec};
use tracing::{info, warn};

use super::{SideEffect, StepOutcome};
use crate::clients::{MailingListClient, SubscribeRequest};

/// Subscribe the submitter's address to the form's mailing list
pub struct MailingListSubscribe {
    client: Arc<dyn MailingListClient>,
}

impl MailingListSubscribe {
    pub fn new(client: Arc<dyn MailingListClient>) -> Self {
        Self { client }
    }
}

/// Merge variables for a subscription: every non-empty value under its
/// upper-cased field name, then the form's own variables on top.
///
/// Empty values are left out so a repeat submission with a blank optional
/// field does not wipe what the list already holds.
pub fn build_merge_vars(values: &SanitisedValues, custom: &Map<String, Value>) -> Map<String, Value> {
    let mut merge_vars: Map<String, Value> = values
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(field, value)| (field.to_uppercase(), Value::String(value.to_string())))
        .collect();

    for (key, value) in custom {
        merge_vars.insert(key.clone(), value.clone());
    }
    merge_vars
}

#[async_trait]
impl SideEffect for MailingListSubscribe {
    fn name(&self) -> &'static str {
        "subscribe"
    }

    fn debug_key(&self) -> &'static str {
        "mailchimp"
    }

    fn failure_message(&self) -> &'static str {
        "Error while subscribing to the mailing list."
    }

    fn applies_to(&self, spec: &SubmissionSpec) -> bool {
        spec.mailing_list().is_some()
    }

    async fn apply(&self, values: &SanitisedValues, spec: &SubmissionSpec) -> StepOutcome {
        let Some(list) = spec.mailing_list() else {
            return StepOutcome::ok(None);
        };

        let Some(email) = values.get("email").filter(|email| !email.is_empty()) else {
            warn!(action = spec.action(), "No email address to subscribe");
            return StepOutcome::failed(Some(json!({ "error": "No email address to subscribe" })));
        };

        let request = SubscribeRequest {
            list_id: list.list_id.clone(),
            email: email.to_string(),
            merge_vars: build_merge_vars(values, &list.merge_vars),
            double_optin: list.double_optin,
            update_existing: list.update_existing,
            replace_interests: list.replace_interests,
            send_welcome: list.send_welcome,
        };

        match self.client.subscribe(&request).await {
            Ok(response) => {
                info!(action = spec.action(), list_id = %list.list_id, "Address subscribed");
                StepOutcome::ok(Some(response))
            }
            Err(e) => {
                warn!(action = spec.action(), list_id = %list.list_id, error = %e, "Subscription failed");
                StepOutcome::failed(Some(e.debug_payload()))
            }
        }
    }
}
