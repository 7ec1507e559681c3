//! Cache and mutation metrics recording.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

/// How a mutation run ended, as recorded in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Committed,
    RolledBack,
    /// Refused before any write (busy key, invalid move, undeclared key).
    Rejected,
}

impl MutationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
            Self::Rejected => "rejected",
        }
    }
}

/// Recorder de metricas de sincronizacion.
///
/// Los contadores atomicos internos permiten leer totales en tests y logs
/// sin tener un recorder instalado.
#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    invalidations: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    rejected: AtomicU64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        counter!("kanban_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        counter!("kanban_cache_misses_total").increment(1);
    }

    pub fn record_write(&self) {
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        counter!("kanban_cache_writes_total").increment(1);
    }

    pub fn record_invalidations(&self, count: usize) {
        if count == 0 {
            return;
        }
        self.counters
            .invalidations
            .fetch_add(count as u64, Ordering::Relaxed);
        counter!("kanban_cache_invalidations_total").increment(count as u64);
    }

    /// Registra la resolucion de una mutacion
    pub fn record_mutation(&self, mutation: &'static str, outcome: MutationOutcome) {
        let slot = match outcome {
            MutationOutcome::Committed => &self.counters.committed,
            MutationOutcome::RolledBack => &self.counters.rolled_back,
            MutationOutcome::Rejected => &self.counters.rejected,
        };
        slot.fetch_add(1, Ordering::Relaxed);
        counter!(
            "kanban_mutations_total",
            "mutation" => mutation,
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        gauge!("kanban_cache_entries").set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("kanban_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Helper para medir tiempo de operacion
    pub fn time_operation<T, F: FnOnce() -> T>(&self, operation: &'static str, f: F) -> T {
        let start = Instant::now();
        let result = f();
        self.record_operation_duration(operation, start.elapsed());
        result
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.counters.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.counters.misses.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.counters.writes.load(Ordering::Relaxed)
    }

    pub fn invalidations(&self) -> u64 {
        self.counters.invalidations.load(Ordering::Relaxed)
    }

    pub fn committed(&self) -> u64 {
        self.counters.committed.load(Ordering::Relaxed)
    }

    pub fn rolled_back(&self) -> u64 {
        self.counters.rolled_back.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.counters.rejected.load(Ordering::Relaxed)
    }
}
