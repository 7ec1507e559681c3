//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Describe las metricas. Llamar una vez al inicio.
pub fn register_metrics() {
    metrics::describe_counter!("kanban_cache_hits_total", "Reads served from a fresh entry");
    metrics::describe_counter!("kanban_cache_misses_total", "Reads that required a fetch");
    metrics::describe_counter!("kanban_cache_writes_total", "Entries written");
    metrics::describe_counter!(
        "kanban_cache_invalidations_total",
        "Entries marked stale by invalidation"
    );
    metrics::describe_counter!(
        "kanban_mutations_total",
        "Mutation runs by mutation name and outcome"
    );
    metrics::describe_gauge!("kanban_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "kanban_operation_seconds",
        "Time spent on fetches and mutation pipelines"
    );
}

/// Installs the global Prometheus recorder and returns its handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(&[
            0.001, // 1 milisegundo
            0.005, // 5 milisegundos
            0.01,  // 10 milisegundos
            0.05,  // 50 milisegundos
            0.1,   // 100 milisegundos
            0.25,  // 250 milisegundos
            0.5,   // 500 milisegundos
            1.0,   // 1 segundo
            2.5,   // 2.5 segundos
            5.0,   // 5 segundos
            15.0,  // timeout por defecto
        ])?
        .install_recorder()?;

    register_metrics();
    info!("Metrics system initialized");
    Ok(handle)
}
