use anyhow::Result;
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::metrics;

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    /// Install the global tracing subscriber and build the metrics registry.
    /// Call once, before anything logs.
    pub fn init() -> Result<Self> {
        let registry = Registry::new_custom(Some("formpost".into()), None)?;
        metrics::register_all(&registry)?;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "api=debug,shared=info,tower_http=info".into());

        let json = std::env::var("LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        // The two fmt layers have different types, so pick via Option
        let (json_layer, text_layer) = if json {
            (Some(tracing_subscriber::fmt::layer().json()), None)
        } else {
            (None, Some(tracing_subscriber::fmt::layer()))
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .with(text_layer)
            .try_init()?;

        tracing::info!(json, "Observability stack initialized (Prometheus + tracing)");
        Ok(Self { registry })
    }
}
