//! Sanitise and validate posted values against a [`SubmissionSpec`].

use tracing::debug;

use crate::error::SubmissionError;
use crate::sanitizers::sanitize;
use crate::submission::{SubmissionSpec, ValidationStep};
use crate::validators::check_format;
use crate::values::{RawInput, SanitisedValues};

/// Outcome of validating one submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    /// Every field that was posted, sanitised, whether or not it passed.
    pub values: SanitisedValues,
    /// Errors in field declaration order.
    pub errors: Vec<SubmissionError>,
}

impl Validation {
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Check every field `spec` declares, in order. Never stops early: the
/// visitor gets all problems with the form at once.
pub fn validate(spec: &SubmissionSpec, raw: &RawInput) -> Validation {
    let mut result = Validation::default();

    for rule in spec.rules() {
        let Some(definition) = spec.registry().lookup(&rule.field) else {
            result
                .errors
                .push(SubmissionError::UnknownField(rule.field.clone()));
            continue;
        };

        let Some(raw_value) = raw.get(&rule.field) else {
            result
                .errors
                .push(SubmissionError::FieldAbsent(rule.field.clone()));
            continue;
        };

        let value = sanitize(definition.kind, raw_value);

        if rule.requires(ValidationStep::NotProvided) && value.is_empty() {
            result.errors.push(SubmissionError::FieldNotProvided {
                field: rule.field.clone(),
                message: definition.not_provided_message.clone(),
            });
        } else if rule.requires(ValidationStep::Invalid) && definition.kind.has_format_check() {
            if let Err(reason) = check_format(definition.kind, &value) {
                debug!(field = %rule.field, %reason, "field failed format check");
                result.errors.push(SubmissionError::FieldInvalid {
                    field: rule.field.clone(),
                    message: definition.invalid_message(),
                });
            }
        }

        result.values.insert(rule.field.clone(), value);
    }

    debug!(
        action = spec.action(),
        fields = spec.rules().len(),
        errors = result.errors.len(),
        "submission validated"
    );

    result
}
