//! Submission specs
//!
//! A [`SubmissionSpec`] declares, for one form action, which fields are read
//! (in order), which validation steps apply to each, and which side effects
//! run once the values are clean.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::{FieldDefinition, FieldRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStep {
    /// The sanitised value must not be empty.
    NotProvided,
    /// The sanitised value must pass the kind's format check.
    Invalid,
}

/// One field of a form and the steps it is checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: String,
    pub steps: Vec<ValidationStep>,
}

impl FieldRule {
    pub fn requires(&self, step: ValidationStep) -> bool {
        self.steps.contains(&step)
    }
}

/// Mailing-list subscription settings for a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailingListConfig {
    pub list_id: String,
    /// Extra merge variables sent with every subscription (e.g. group tagging).
    #[serde(default)]
    pub merge_vars: Map<String, Value>,
    pub double_optin: bool,
    pub update_existing: bool,
    pub replace_interests: bool,
    pub send_welcome: bool,
}

impl MailingListConfig {
    /// Single opt-in, update existing members, keep their interests, no
    /// welcome email.
    pub fn new(list_id: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            merge_vars: Map::new(),
            double_optin: false,
            update_existing: true,
            replace_interests: false,
            send_welcome: false,
        }
    }

    pub fn merge_var(mut self, key: impl Into<String>, value: Value) -> Self {
        self.merge_vars.insert(key.into(), value);
        self
    }

    pub fn double_optin(mut self, enabled: bool) -> Self {
        self.double_optin = enabled;
        self
    }

    pub fn send_welcome(mut self, enabled: bool) -> Self {
        self.send_welcome = enabled;
        self
    }
}

/// Notification email settings for a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub from: String,
    pub to: String,
    pub subject: String,
}

impl EmailConfig {
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionSpec {
    action: String,
    registry: FieldRegistry,
    rules: Vec<FieldRule>,
    mailing_list: Option<MailingListConfig>,
    email: Option<EmailConfig>,
}

impl SubmissionSpec {
    /// Start a spec for `action` on top of the base field catalog.
    pub fn new(action: impl Into<String>) -> Self {
        Self::with_registry(action, FieldRegistry::base())
    }

    pub fn with_registry(action: impl Into<String>, registry: FieldRegistry) -> Self {
        Self {
            action: action.into(),
            registry,
            rules: Vec::new(),
            mailing_list: None,
            email: None,
        }
    }

    /// Extend or override the field catalog for this spec only.
    pub fn define(mut self, definition: FieldDefinition) -> Self {
        self.registry = self.registry.with(definition);
        self
    }

    /// Read `field`, checking it against `steps`. Declaring the same field
    /// twice replaces the earlier steps but keeps its position.
    pub fn field(mut self, field: impl Into<String>, steps: &[ValidationStep]) -> Self {
        let field = field.into();
        let steps = steps.to_vec();
        match self.rules.iter_mut().find(|rule| rule.field == field) {
            Some(rule) => rule.steps = steps,
            None => self.rules.push(FieldRule { field, steps }),
        }
        self
    }

    pub fn subscribe(mut self, config: MailingListConfig) -> Self {
        self.mailing_list = Some(config);
        self
    }

    pub fn notify(mut self, config: EmailConfig) -> Self {
        self.email = Some(config);
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn mailing_list(&self) -> Option<&MailingListConfig> {
        self.mailing_list.as_ref()
    }

    pub fn email(&self) -> Option<&EmailConfig> {
        self.email.as_ref()
    }

    /// Fields referenced by the rules but missing from the registry.
    /// Empty for a well-formed spec.
    pub fn unknown_fields(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| !self.registry.contains(&rule.field))
            .map(|rule| rule.field.as_str())
            .collect()
    }
}
