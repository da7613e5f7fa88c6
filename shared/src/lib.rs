pub mod envelope;
pub mod error;
pub mod fields;
pub mod sanitizers;
pub mod submission;
pub mod validator;
pub mod validators;
pub mod values;

pub use envelope::ResponseEnvelope;
pub use error::{SubmissionError, SubmissionResult};
pub use fields::{FieldDefinition, FieldKind, FieldRegistry};
pub use submission::{EmailConfig, FieldRule, MailingListConfig, SubmissionSpec, ValidationStep};
pub use validator::{validate, Validation};
pub use values::{RawInput, SanitisedValues};
