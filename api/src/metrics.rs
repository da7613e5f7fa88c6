use once_cell::sync::Lazy;
use prometheus::{opts, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Registry};

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| IntCounterVec::new(opts!($name, $help), $labels).unwrap())
    };
}
macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            HistogramVec::new(HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()), $labels)
                .unwrap()
        })
    };
}
macro_rules! gauge {
    ($name:expr, $help:expr) => {
        Lazy::new(|| IntGauge::new($name, $help).unwrap())
    };
}

const LATENCY_BUCKETS: [f64; 12] = [
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

// ── HTTP ────────────────────────────────────────────────────────────────────
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> =
    counter_vec!("http_requests_total", "Total HTTP requests", &["method", "path", "status"]);
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> =
    histogram_vec!("http_request_duration_seconds", "HTTP request latency", &["method", "path"]);
pub static HTTP_IN_FLIGHT: Lazy<IntGauge> = gauge!("http_requests_in_flight", "In-flight HTTP requests");

// ── Submissions ─────────────────────────────────────────────────────────────
pub static SUBMISSIONS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "submissions_total",
    "Form submissions by action and outcome",
    &["action", "outcome"]
);
pub static VALIDATION_ERRORS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "validation_errors_total",
    "Field validation errors by action and kind",
    &["action", "kind"]
);

// ── Side effects ────────────────────────────────────────────────────────────
pub static SIDE_EFFECT_DURATION: Lazy<HistogramVec> =
    histogram_vec!("side_effect_duration_seconds", "Outbound side-effect latency", &["step"]);
pub static SIDE_EFFECT_FAILURES: Lazy<IntCounterVec> =
    counter_vec!("side_effect_failures_total", "Failed side-effect steps", &["step"]);

pub fn register_all(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    registry.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    registry.register(Box::new(HTTP_IN_FLIGHT.clone()))?;
    registry.register(Box::new(SUBMISSIONS_TOTAL.clone()))?;
    registry.register(Box::new(VALIDATION_ERRORS_TOTAL.clone()))?;
    registry.register(Box::new(SIDE_EFFECT_DURATION.clone()))?;
    registry.register(Box::new(SIDE_EFFECT_FAILURES.clone()))?;
    Ok(())
}

pub fn observe_http(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Collapse request paths to a bounded label set
pub fn path_label(path: &str) -> &'static str {
    match path {
        "/ajax" => "/ajax",
        "/health" => "/health",
        "/metrics" => "/metrics",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let registry = Registry::new_custom(Some("test".into()), None).unwrap();
        register_all(&registry).unwrap();

        SUBMISSIONS_TOTAL.with_label_values(&["enquiries", "success"]).inc();
        SIDE_EFFECT_FAILURES.with_label_values(&["email"]).inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|fam| fam.get_name().to_string())
            .collect();
        assert!(names.contains(&"test_submissions_total".to_string()));
        assert!(names.contains(&"test_side_effect_failures_total".to_string()));
        assert!(names.iter().all(|name| name.starts_with("test_")));
    }

    #[test]
    fn test_path_label() {
        assert_eq!(path_label("/ajax"), "/ajax");
        assert_eq!(path_label("/wp-admin"), "other");
    }
}
