use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

pub const TX_MINED: &str = "tx_mined";
pub const TX_FAILED: &str = "tx_failed";
pub const CONTRACTS_DEPLOYED: &str = "contracts_deployed";
pub const CALLS: &str = "calls";

/// Metrics registry (simple, Prometheus-style counters)
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    counters: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_counter(&self, name: &str) {
        let mut counters = self.counters.lock();
        *counters.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters.lock().clone()
    }
}

lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}
