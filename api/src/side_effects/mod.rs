//! Post-validation side effects
//!
//! A side effect runs only after a submission validated cleanly. Steps run
//! in the fixed order the pipeline was built with; the first failure stops
//! the rest. Steps never touch the envelope themselves: they report an
//! outcome and the pipeline decides what the visitor sees.

use async_trait::async_trait;
use serde_json::Value;
use shared::{SanitisedValues, SubmissionSpec};

pub mod notify;
pub mod subscribe;

pub use notify::EmailNotify;
pub use subscribe::MailingListSubscribe;

/// Result of running one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub is_error: bool,
    /// Diagnostics, attached to the response only in debug mode
    pub debug: Option<Value>,
}

impl StepOutcome {
    pub fn ok(debug: Option<Value>) -> Self {
        Self {
            is_error: false,
            debug,
        }
    }

    pub fn failed(debug: Option<Value>) -> Self {
        Self {
            is_error: true,
            debug,
        }
    }
}

#[async_trait]
pub trait SideEffect: Send + Sync {
    /// Stable step name for logs and metrics
    fn name(&self) -> &'static str;

    /// Key of the envelope's `data` object that carries this step's
    /// diagnostics
    fn debug_key(&self) -> &'static str;

    /// Shown to the visitor on failure, debug mode only
    fn failure_message(&self) -> &'static str;

    /// Whether `spec` opted into this step
    fn applies_to(&self, spec: &SubmissionSpec) -> bool;

    async fn apply(&self, values: &SanitisedValues, spec: &SubmissionSpec) -> StepOutcome;
}
