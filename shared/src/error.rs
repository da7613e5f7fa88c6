use thiserror::Error;

/// Everything that can turn a submission into an error envelope.
///
/// The `Display` output of each variant is the exact message shown to the
/// visitor, so these strings are part of the wire contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Action not provided.")]
    MissingAction,

    #[error("Invalid action: {0}.")]
    UnknownAction(String),

    /// A form could not be built from the request, e.g. a missing
    /// discriminator field.
    #[error("{0}")]
    SpecPrecondition(String),

    #[error("Unknown field: {0}.")]
    UnknownField(String),

    /// The field was not part of the POSTed data at all.
    #[error("Field not provided: {0}.")]
    FieldAbsent(String),

    /// The field was posted but is empty after sanitisation.
    #[error("{message}")]
    FieldNotProvided { field: String, message: String },

    #[error("{message}")]
    FieldInvalid { field: String, message: String },

    #[error("{message}")]
    SideEffectFailure { step: &'static str, message: String },
}

impl SubmissionError {
    /// Name of the field the error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownField(field) | Self::FieldAbsent(field) => Some(field),
            Self::FieldNotProvided { field, .. } | Self::FieldInvalid { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Short stable label, used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingAction => "missing_action",
            Self::UnknownAction(_) => "unknown_action",
            Self::SpecPrecondition(_) => "spec_precondition",
            Self::UnknownField(_) => "unknown_field",
            Self::FieldAbsent(_) => "field_absent",
            Self::FieldNotProvided { .. } => "field_not_provided",
            Self::FieldInvalid { .. } => "field_invalid",
            Self::SideEffectFailure { .. } => "side_effect_failure",
        }
    }
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;
