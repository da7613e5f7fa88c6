use std::collections::HashMap;
use std::sync::Arc;

use shared::{RawInput, ResponseEnvelope, SubmissionError};
use tracing::{debug, info};

use crate::clients::{MailTransport, MailingListClient};
use crate::config::FormsConfig;
use crate::forms::{SpecConstructor, ACTIONS};
use crate::metrics::SUBMISSIONS_TOTAL;
use crate::pipeline::SubmissionPipeline;
use crate::side_effects::{EmailNotify, MailingListSubscribe, SideEffect};

/// Routes a submission to its form and runs it
pub struct Dispatcher {
    actions: HashMap<&'static str, SpecConstructor>,
    forms: FormsConfig,
    pipeline: SubmissionPipeline,
}

impl Dispatcher {
    pub fn new(
        forms: FormsConfig,
        actions: &[(&'static str, SpecConstructor)],
        steps: Vec<Arc<dyn SideEffect>>,
    ) -> Self {
        let pipeline = SubmissionPipeline::new(steps, forms.debug, forms.success_message.clone());
        Self {
            actions: actions.iter().copied().collect(),
            forms,
            pipeline,
        }
    }

    /// The site's forms, subscribing before notifying.
    pub fn with_clients(
        forms: FormsConfig,
        mailing_list: Arc<dyn MailingListClient>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let steps: Vec<Arc<dyn SideEffect>> = vec![
            Arc::new(MailingListSubscribe::new(mailing_list)),
            Arc::new(EmailNotify::new(transport)),
        ];
        Self::new(forms, ACTIONS, steps)
    }

    pub fn forms(&self) -> &FormsConfig {
        &self.forms
    }

    pub async fn dispatch(&self, action: Option<&str>, raw: &RawInput) -> ResponseEnvelope {
        let Some(action) = action else {
            return self.reject("none", SubmissionError::MissingAction);
        };

        let Some(constructor) = self.actions.get(action) else {
            return self.reject("unknown", SubmissionError::UnknownAction(action.to_string()));
        };

        let spec = match constructor(&self.forms, raw) {
            Ok(spec) => spec,
            Err(e) => return self.reject(action, e),
        };

        debug!(action, fields = spec.rules().len(), "Dispatching submission");
        self.pipeline.run(&spec, raw).await
    }

    /// Envelope for a request body that could not be decoded at all
    pub fn error_envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope::error(self.forms.error_message.clone())
    }

    fn reject(&self, action: &str, error: SubmissionError) -> ResponseEnvelope {
        info!(action, kind = error.kind(), "Submission refused: {}", error);
        SUBMISSIONS_TOTAL.with_label_values(&[action, "refused"]).inc();
        ResponseEnvelope::from(error)
    }
}
