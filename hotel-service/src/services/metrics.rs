//! Prometheus metrics for hotel-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Reservation attempts by guard mode and outcome: created, unavailable, rejected, error.
pub static RESERVATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hotel_reservations_total",
        "Total number of reservation attempts",
        &["guard", "outcome"]
    )
    .expect("Failed to register reservations_total")
});

/// Status changes applied, by resulting status.
pub static STATUS_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hotel_reservation_status_transitions_total",
        "Total number of reservation status transitions",
        &["from", "to"]
    )
    .expect("Failed to register reservation_status_transitions_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "hotel_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&RESERVATIONS_TOTAL);
    Lazy::force(&STATUS_TRANSITIONS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
