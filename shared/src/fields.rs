//! Field registry
//!
//! Every field a form may reference is declared here once, with the kind of
//! value it holds and the messages shown when it is missing or malformed.
//! Forms start from [`FieldRegistry::base`] and layer their own definitions
//! on top with [`FieldRegistry::with`].

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Kind of value a field carries; drives sanitisation and format checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Url,
    Textarea,
}

impl FieldKind {
    /// Whether the kind has a format check for the `invalid` step.
    pub fn has_format_check(self) -> bool {
        matches!(self, FieldKind::Email | FieldKind::Url)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Textarea => "textarea",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    pub not_provided_message: String,
    pub invalid_message: Option<String>,
}

impl FieldDefinition {
    pub fn new(
        name: impl Into<String>,
        kind: FieldKind,
        not_provided_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            not_provided_message: not_provided_message.into(),
            invalid_message: None,
        }
    }

    pub fn text(name: impl Into<String>, not_provided_message: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, not_provided_message)
    }

    pub fn textarea(name: impl Into<String>, not_provided_message: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Textarea, not_provided_message)
    }

    pub fn email(name: impl Into<String>, not_provided_message: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email, not_provided_message)
    }

    pub fn url(name: impl Into<String>, not_provided_message: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Url, not_provided_message)
    }

    pub fn invalid(mut self, message: impl Into<String>) -> Self {
        self.invalid_message = Some(message.into());
        self
    }

    /// Message for a failed format check; falls back to a generic one when
    /// the definition does not carry its own.
    pub fn invalid_message(&self) -> String {
        self.invalid_message
            .clone()
            .unwrap_or_else(|| format!("Invalid value for field: {}.", self.name))
    }
}

lazy_static! {
    /// Fields shared by every form on the site
    static ref BASE_FIELDS: Vec<FieldDefinition> = vec![
        FieldDefinition::email("email", "Please enter your email address.")
            .invalid("Your email address doesn't seem to be valid."),
        FieldDefinition::text("name", "Please enter your name."),
        FieldDefinition::text("first", "Please enter your first name."),
        FieldDefinition::text("last", "Please enter your last name."),
        FieldDefinition::text("org", "Please enter the name of your organisation."),
        FieldDefinition::text("phone", "Please enter your phone number.")
            .invalid("Your phone number doesn't seem to be valid."),
    ];
}

/// Read-only catalog of field definitions keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: HashMap<String, FieldDefinition>,
}

impl FieldRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The site-wide catalog every form starts from
    pub fn base() -> Self {
        Self::empty().with_all(BASE_FIELDS.iter().cloned())
    }

    /// Add a definition, replacing any existing one with the same name.
    pub fn with(mut self, definition: FieldDefinition) -> Self {
        self.fields.insert(definition.name.clone(), definition);
        self
    }

    pub fn with_all(self, definitions: impl IntoIterator<Item = FieldDefinition>) -> Self {
        definitions.into_iter().fold(self, FieldRegistry::with)
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_catalog() {
        let registry = FieldRegistry::base();
        assert_eq!(registry.len(), 6);

        let email = registry.lookup("email").unwrap();
        assert_eq!(email.kind, FieldKind::Email);
        assert_eq!(email.not_provided_message, "Please enter your email address.");
        assert_eq!(
            email.invalid_message.as_deref(),
            Some("Your email address doesn't seem to be valid.")
        );

        assert!(registry.lookup("comments").is_none());
    }

    #[test]
    fn test_with_extends_and_overrides() {
        let registry = FieldRegistry::base()
            .with(FieldDefinition::textarea("comments", "Please enter your comments."))
            .with(FieldDefinition::text("org", "Please enter your school or RTO."));

        assert_eq!(registry.len(), 7);
        assert_eq!(registry.lookup("comments").unwrap().kind, FieldKind::Textarea);
        assert_eq!(
            registry.lookup("org").unwrap().not_provided_message,
            "Please enter your school or RTO."
        );

        // The shared base table is untouched
        assert_eq!(
            FieldRegistry::base().lookup("org").unwrap().not_provided_message,
            "Please enter the name of your organisation."
        );
    }

    #[test]
    fn test_invalid_message_fallback() {
        let field = FieldDefinition::url("website", "Please enter your website.");
        assert_eq!(field.invalid_message(), "Invalid value for field: website.");
        let field = field.invalid("Your website address doesn't seem to be valid.");
        assert_eq!(field.invalid_message(), "Your website address doesn't seem to be valid.");
    }

    #[test]
    fn test_kind_format_checks() {
        assert!(FieldKind::Email.has_format_check());
        assert!(FieldKind::Url.has_format_check());
        assert!(!FieldKind::Text.has_format_check());
        assert!(!FieldKind::Textarea.has_format_check());
        assert_eq!(FieldKind::Textarea.to_string(), "textarea");
    }
}
