use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static EVENT_REGISTRATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "roborumble_event_registrations_total",
        "Event registrations accepted"
    )
    .expect("register event_registrations_total")
});

pub static PAYMENT_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "roborumble_payment_failures_total",
        "Gateway payments rejected or failed"
    )
    .expect("register payment_failures_total")
});

pub static TEAMS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "roborumble_teams_created_total",
        "Teams created"
    )
    .expect("register teams_created_total")
});

/// Touch every counter so they show up in `/metrics` before their first increment.
pub fn init() {
    Lazy::force(&EVENT_REGISTRATIONS_TOTAL);
    Lazy::force(&PAYMENT_FAILURES_TOTAL);
    Lazy::force(&TEAMS_CREATED_TOTAL);
    service::metrics::init();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
