//! The site's forms
//!
//! Each action maps to a constructor that builds the form's spec from the
//! configuration and, where the form has variants, the posted input.

use serde_json::json;
use shared::{
    FieldDefinition, MailingListConfig, RawInput, SubmissionError, SubmissionResult, SubmissionSpec,
    ValidationStep::{Invalid, NotProvided},
};

use crate::config::FormsConfig;

pub type SpecConstructor = fn(&FormsConfig, &RawInput) -> SubmissionResult<SubmissionSpec>;

/// Name of the Mailchimp interest grouping that tags registrations
const REGISTRATION_GROUPING: &str = "Registration type";

pub const ACTIONS: &[(&str, SpecConstructor)] = &[
    ("enquiries", enquiries),
    ("vetcommons", vetcommons),
    ("elink", elink),
    ("consultant", consultant),
];

fn registration_group(group: &str) -> serde_json::Value {
    json!([{ "name": REGISTRATION_GROUPING, "groups": [group] }])
}

/// General contact form
pub fn enquiries(config: &FormsConfig, _raw: &RawInput) -> SubmissionResult<SubmissionSpec> {
    Ok(SubmissionSpec::new("enquiries")
        .define(FieldDefinition::textarea("comments", "Please enter your comments."))
        .define(FieldDefinition::text("how", "Please tell us how you heard about us."))
        .field("name", &[NotProvided])
        .field("org", &[NotProvided])
        .field("email", &[NotProvided, Invalid])
        .field("phone", &[NotProvided])
        .field("comments", &[])
        .field("how", &[])
        .notify(config.enquiries.clone()))
}

/// VET Commons registration. `type` picks between the user and publisher
/// variants.
pub fn vetcommons(config: &FormsConfig, raw: &RawInput) -> SubmissionResult<SubmissionSpec> {
    let registration = raw.get("type").map(str::trim).unwrap_or_default();

    let spec = SubmissionSpec::new("vetcommons")
        .field("first", &[NotProvided])
        .field("last", &[NotProvided])
        .field("email", &[NotProvided, Invalid]);

    match registration {
        "" => Err(SubmissionError::SpecPrecondition(
            "Registration type not provided.".to_string(),
        )),
        "user" => Ok(spec.field("org", &[]).subscribe(
            MailingListConfig::new(config.vetcommons_list_id.clone())
                .merge_var("GROUPINGS", registration_group("Users")),
        )),
        "publisher" => Ok(spec
            .define(
                FieldDefinition::url("website", "Please enter your website address.")
                    .invalid("Your website address doesn't seem to be valid."),
            )
            .field("org", &[NotProvided])
            .field("phone", &[NotProvided])
            .field("website", &[NotProvided, Invalid])
            .subscribe(
                MailingListConfig::new(config.vetcommons_list_id.clone())
                    .merge_var("GROUPINGS", registration_group("Publishers")),
            )
            .notify(config.vetcommons.clone())),
        other => Err(SubmissionError::SpecPrecondition(format!(
            "Invalid registration type: {}.",
            other
        ))),
    }
}

/// Newsletter signup
pub fn elink(config: &FormsConfig, _raw: &RawInput) -> SubmissionResult<SubmissionSpec> {
    Ok(SubmissionSpec::new("elink")
        .field("email", &[NotProvided, Invalid])
        .field("first", &[])
        .field("last", &[])
        .field("org", &[])
        .subscribe(MailingListConfig::new(config.elink_list_id.clone())))
}

/// Consultant directory registration
pub fn consultant(config: &FormsConfig, _raw: &RawInput) -> SubmissionResult<SubmissionSpec> {
    Ok(SubmissionSpec::new("consultant")
        .define(FieldDefinition::url("website", "Please enter your website address."))
        .define(FieldDefinition::textarea(
            "expertise",
            "Please describe your areas of expertise.",
        ))
        .field("first", &[NotProvided])
        .field("last", &[NotProvided])
        .field("email", &[NotProvided, Invalid])
        .field("phone", &[NotProvided])
        .field("org", &[])
        .field("website", &[])
        .field("expertise", &[NotProvided])
        .notify(config.consultant.clone()))
}
