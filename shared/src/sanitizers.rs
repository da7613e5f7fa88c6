//! Input sanitization functions
//!
//! Every posted value goes through [`sanitize`] before it is validated or
//! handed to a side effect. All sanitizers are idempotent: running one on
//! its own output returns the same string.

use lazy_static::lazy_static;
use regex::Regex;

use crate::fields::FieldKind;

lazy_static! {
    /// Pattern to match HTML tags
    static ref HTML_TAG_PATTERN: Regex = Regex::new(r"<[^>]*>").unwrap();

    /// Pattern to match multiple whitespace characters
    static ref MULTI_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Pattern to match control characters (except newline, carriage return and tab)
    static ref CONTROL_CHARS: Regex = Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
}

/// Punctuation allowed in an email address besides ASCII letters and digits
const EMAIL_PUNCTUATION: &str = "!#$%&'*+-=?^_`{|}~@.[]";

/// Punctuation allowed in a URL besides ASCII letters and digits
const URL_PUNCTUATION: &str = "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=";

/// Sanitize a raw value according to the kind of field it was posted for
pub fn sanitize(kind: FieldKind, value: &str) -> String {
    match kind {
        FieldKind::Email => sanitize_email(value),
        FieldKind::Url => sanitize_url(value),
        FieldKind::Text => sanitize_text(value),
        FieldKind::Textarea => sanitize_multiline(value),
    }
}

/// Trim leading and trailing whitespace from a string
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Normalize whitespace: collapse multiple spaces/newlines into single space
pub fn normalize_whitespace(value: &str) -> String {
    MULTI_WHITESPACE.replace_all(value.trim(), " ").to_string()
}

/// Strip all HTML tags from a string
pub fn strip_html(value: &str) -> String {
    HTML_TAG_PATTERN.replace_all(value, "").to_string()
}

/// Remove angle brackets left over once tags are gone (`a < b`, `<<x>>`)
pub fn strip_angle_brackets(value: &str) -> String {
    value.chars().filter(|c| *c != '<' && *c != '>').collect()
}

/// Remove control characters from a string
pub fn remove_control_chars(value: &str) -> String {
    CONTROL_CHARS.replace_all(value, "").to_string()
}

/// Sanitize a single-line text field: remove control chars, strip markup,
/// collapse whitespace
pub fn sanitize_text(value: &str) -> String {
    let no_control = remove_control_chars(value);
    let no_html = strip_angle_brackets(&strip_html(&no_control));
    normalize_whitespace(&no_html)
}

/// Sanitize a multi-line text field: like [`sanitize_text`] but line
/// breaks survive
pub fn sanitize_multiline(value: &str) -> String {
    let no_control = remove_control_chars(value);
    let no_html = strip_angle_brackets(&strip_html(&no_control));
    trim(&no_html)
}

/// Keep only the characters that may appear in an email address
pub fn sanitize_email(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || EMAIL_PUNCTUATION.contains(*c))
        .collect()
}

/// Keep only the characters that may appear in a URL
pub fn sanitize_url(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || URL_PUNCTUATION.contains(*c))
        .collect()
}

/// Escape special characters for safe display in an HTML document
pub fn escape_for_display(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
