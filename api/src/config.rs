//! Service configuration
//! Loaded once from the environment at startup and never mutated afterwards

use shared::EmailConfig;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Submission successful.";
pub const DEFAULT_ERROR_MESSAGE: &str = "An unknown error occurred while processing your request. \
If the problem persists, please use our <a href=\"/contact\">contact form</a>.";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid boolean for {key}: {value}")]
    InvalidBool { key: String, value: String },
}

/// Read a variable, treating empty values as unset
fn read<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn read_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    read(lookup, key).unwrap_or_else(|| default.to_string())
}

fn read_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match read(lookup, key) {
        None => Ok(default),
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                key: key.to_string(),
                value,
            }),
        },
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Origins allowed by CORS; empty means any origin
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = read_or(lookup, "FORMS_BIND_ADDR", "0.0.0.0:3001");
        let bind_addr = raw_addr.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidConfig(format!("Invalid bind address {}: {}", raw_addr, e))
        })?;

        let allowed_origins = read(lookup, "FORMS_ALLOWED_ORIGINS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ServerConfig {
            bind_addr,
            allowed_origins,
        })
    }
}

/// Per-form constants and response texts
#[derive(Debug, Clone, PartialEq)]
pub struct FormsConfig {
    /// Attach internal diagnostics to responses. Echoes user input back:
    /// never enable against production traffic.
    pub debug: bool,
    pub success_message: String,
    pub error_message: String,
    pub enquiries: EmailConfig,
    pub vetcommons_list_id: String,
    pub vetcommons: EmailConfig,
    pub elink_list_id: String,
    pub consultant: EmailConfig,
}

impl Default for FormsConfig {
    fn default() -> Self {
        FormsConfig {
            debug: false,
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            enquiries: EmailConfig::new(
                "no-reply@localhost",
                "enquiries@localhost",
                "Contact form response",
            ),
            vetcommons_list_id: String::new(),
            vetcommons: EmailConfig::new(
                "no-reply@localhost",
                "registrations@localhost",
                "VET Commons publisher registration",
            ),
            elink_list_id: String::new(),
            consultant: EmailConfig::new(
                "no-reply@localhost",
                "consultants@localhost",
                "Consultant registration",
            ),
        }
    }
}

impl FormsConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = FormsConfig::default();
        let email = |prefix: &str, fallback: &EmailConfig| EmailConfig {
            from: read_or(lookup, &format!("{}_FROM", prefix), &fallback.from),
            to: read_or(lookup, &format!("{}_TO", prefix), &fallback.to),
            subject: read_or(lookup, &format!("{}_SUBJECT", prefix), &fallback.subject),
        };

        let config = FormsConfig {
            debug: read_bool(lookup, "FORMS_DEBUG", false)?,
            success_message: read_or(lookup, "FORMS_SUCCESS_MESSAGE", &defaults.success_message),
            error_message: read_or(lookup, "FORMS_ERROR_MESSAGE", &defaults.error_message),
            enquiries: email("ENQUIRIES", &defaults.enquiries),
            vetcommons_list_id: read_or(lookup, "VETCOMMONS_LIST_ID", ""),
            vetcommons: email("VETCOMMONS", &defaults.vetcommons),
            elink_list_id: read_or(lookup, "ELINK_LIST_ID", ""),
            consultant: email("CONSULTANT", &defaults.consultant),
        };

        if config.vetcommons_list_id.is_empty() {
            warn!("VETCOMMONS_LIST_ID not set; vetcommons subscriptions will be rejected upstream");
        }
        if config.elink_list_id.is_empty() {
            warn!("ELINK_LIST_ID not set; elink subscriptions will be rejected upstream");
        }

        Ok(config)
    }
}

/// Mailing-list API credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailchimpConfig {
    pub api_key: Option<String>,
    /// Base URL of the v2 API, e.g. `https://us6.api.mailchimp.com/2.0`
    pub api_url: Option<String>,
}

impl MailchimpConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = read(lookup, "MAILCHIMP_API_KEY");
        let api_url = match read(lookup, "MAILCHIMP_API_URL") {
            Some(url) => Some(url.trim_end_matches('/').to_string()),
            None => match &api_key {
                Some(key) => Some(Self::url_for_key(key)?),
                None => None,
            },
        };

        if api_key.is_none() {
            warn!("MAILCHIMP_API_KEY not set; mailing-list subscriptions will fail");
        }

        Ok(MailchimpConfig { api_key, api_url })
    }

    /// The API host is encoded in the key's suffix (`<key>-us6`)
    fn url_for_key(key: &str) -> Result<String, ConfigError> {
        match key.rsplit_once('-') {
            Some((_, dc)) if !dc.is_empty() && dc.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Ok(format!("https://{}.api.mailchimp.com/2.0", dc))
            }
            _ => Err(ConfigError::InvalidConfig(
                "MAILCHIMP_API_KEY must end with a datacenter suffix (e.g. -us1)".to_string(),
            )),
        }
    }
}

/// Outbound mail relay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailRelayConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl MailRelayConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = read(lookup, "MAIL_RELAY_URL");
        if url.is_none() {
            warn!("MAIL_RELAY_URL not set; notification emails will only be logged");
        }
        MailRelayConfig {
            url,
            token: read(lookup, "MAIL_RELAY_TOKEN"),
        }
    }
}

/// Service configuration combining all settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub forms: FormsConfig,
    pub mailchimp: MailchimpConfig,
    pub mail_relay: MailRelayConfig,
    pub outbound_timeout: Duration,
}

impl ServiceConfig {
    /// Load full service configuration
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig::from_lookup(lookup)?;
        let forms = FormsConfig::from_lookup(lookup)?;
        let mailchimp = MailchimpConfig::from_lookup(lookup)?;
        let mail_relay = MailRelayConfig::from_lookup(lookup);

        let outbound_timeout_secs = read_or(lookup, "FORMS_OUTBOUND_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid outbound timeout: {}", e))
            })?;

        if !(1..=120).contains(&outbound_timeout_secs) {
            return Err(ConfigError::InvalidConfig(
                "Outbound timeout must be between 1 and 120 seconds".to_string(),
            ));
        }

        if forms.debug {
            warn!("FORMS_DEBUG is enabled: responses echo submitted values, do not expose to production traffic");
        }

        debug!(origins = ?server.allowed_origins, "CORS origins loaded");
        info!(
            "Service configuration loaded: bind={}, debug={}, outbound_timeout={}s",
            server.bind_addr, forms.debug, outbound_timeout_secs
        );

        Ok(ServiceConfig {
            server,
            forms,
            mailchimp,
            mail_relay,
            outbound_timeout: Duration::from_secs(outbound_timeout_secs),
        })
    }
}
