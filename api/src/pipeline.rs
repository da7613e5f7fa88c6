//! Validation followed by side effects, for one submission

use std::sync::Arc;

use shared::{validate, RawInput, ResponseEnvelope, SubmissionError, SubmissionSpec};
use tracing::{debug, info, warn};

use crate::metrics::{SIDE_EFFECT_DURATION, SIDE_EFFECT_FAILURES, SUBMISSIONS_TOTAL, VALIDATION_ERRORS_TOTAL};
use crate::side_effects::SideEffect;

pub struct SubmissionPipeline {
    steps: Vec<Arc<dyn SideEffect>>,
    debug: bool,
    success_message: String,
}

impl SubmissionPipeline {
    /// `steps` run in the given order for every spec that opts into them.
    pub fn new(steps: Vec<Arc<dyn SideEffect>>, debug: bool, success_message: impl Into<String>) -> Self {
        Self {
            steps,
            debug,
            success_message: success_message.into(),
        }
    }

    pub async fn run(&self, spec: &SubmissionSpec, raw: &RawInput) -> ResponseEnvelope {
        let mut envelope = ResponseEnvelope::new();
        let action = spec.action();

        let validation = validate(spec, raw);
        if self.debug {
            envelope.insert_data("values", validation.values.to_json());
        }

        if validation.is_error() {
            for error in &validation.errors {
                VALIDATION_ERRORS_TOTAL
                    .with_label_values(&[action, error.kind()])
                    .inc();
                envelope.fail(error);
            }
            SUBMISSIONS_TOTAL.with_label_values(&[action, "invalid"]).inc();
            info!(action, errors = validation.errors.len(), "Submission rejected");
            return envelope;
        }

        for step in &self.steps {
            if !step.applies_to(spec) {
                continue;
            }

            debug!(action, step = step.name(), "Running side effect");
            let timer = SIDE_EFFECT_DURATION
                .with_label_values(&[step.name()])
                .start_timer();
            let outcome = step.apply(&validation.values, spec).await;
            timer.observe_duration();

            if self.debug {
                if let Some(data) = outcome.debug {
                    envelope.insert_data(step.debug_key(), data);
                }
            }

            if outcome.is_error {
                SIDE_EFFECT_FAILURES.with_label_values(&[step.name()]).inc();
                SUBMISSIONS_TOTAL.with_label_values(&[action, "failed"]).inc();
                warn!(action, step = step.name(), "Side effect failed, skipping remaining steps");

                envelope.is_error = true;
                if self.debug {
                    envelope.fail(&SubmissionError::SideEffectFailure {
                        step: step.name(),
                        message: step.failure_message().to_string(),
                    });
                }
                return envelope;
            }
        }

        SUBMISSIONS_TOTAL.with_label_values(&[action, "success"]).inc();
        info!(action, "Submission processed");
        envelope.push_message(self.success_message.clone());
        envelope
    }
}
