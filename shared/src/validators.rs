//! Format validators for the `invalid` validation step

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::fields::FieldKind;

lazy_static! {
    /// Dot-atom local part, then a domain of DNS labels ending in an
    /// alphabetic top-level label
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$"
    ).unwrap();
}

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Run the format check for `kind`. Kinds without a check always pass.
pub fn check_format(kind: FieldKind, value: &str) -> Result<(), String> {
    match kind {
        FieldKind::Email => validate_email(value),
        FieldKind::Url => validate_url(value),
        FieldKind::Text | FieldKind::Textarea => Ok(()),
    }
}

/// Validate an email address
pub fn validate_email(value: &str) -> Result<(), String> {
    if value.len() > MAX_EMAIL_LENGTH {
        return Err(format!("must be at most {} characters", MAX_EMAIL_LENGTH));
    }

    let local_len = value.split('@').next().map(str::len).unwrap_or(0);
    if local_len > MAX_LOCAL_PART_LENGTH {
        return Err(format!(
            "local part must be at most {} characters",
            MAX_LOCAL_PART_LENGTH
        ));
    }

    if !EMAIL_REGEX.is_match(value) {
        return Err("must be a valid email address".to_string());
    }

    Ok(())
}

/// Validate an absolute http(s) URL with a host
pub fn validate_url(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("must be a valid URL ({})", e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err("must be a valid URL (starting with http:// or https://)".to_string());
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err("must be a valid URL with a host".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jo@acme.com").is_ok());
        assert!(validate_email("o'brien+news@mail.acme.com.au").is_ok());
        assert!(validate_email("first.last@acme.io").is_ok());

        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("jo@").is_err());
        assert!(validate_email("@acme.com").is_err());
        assert!(validate_email("jo@localhost").is_err());
        assert!(validate_email("jo..bloggs@acme.com").is_err());
        assert!(validate_email(".jo@acme.com").is_err());
        assert!(validate_email("jo@-acme.com").is_err());
    }

    #[test]
    fn test_validate_email_length_limits() {
        let long_local = format!("{}@acme.com", "a".repeat(65));
        assert!(validate_email(&long_local).is_err());

        let long_domain = format!("jo@{}.com", "a".repeat(250));
        assert!(validate_email(&long_domain).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://github.com/user/repo").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://acme.com:8080/path?q=1#frag").is_ok());

        assert!(validate_url("not a url").is_err());
        assert!(validate_url("acme.com").is_err());
        assert!(validate_url("ftp://acme.com").is_err());
        assert!(validate_url("mailto:jo@acme.com").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_check_format_by_kind() {
        assert!(check_format(FieldKind::Email, "not-an-email").is_err());
        assert!(check_format(FieldKind::Url, "not-a-url").is_err());
        assert!(check_format(FieldKind::Text, "").is_ok());
        assert!(check_format(FieldKind::Textarea, "<anything>").is_ok());
    }
}
