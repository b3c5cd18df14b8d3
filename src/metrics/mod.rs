use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;

lazy_static! {
    pub static ref POLL_CYCLES_TOTAL: IntCounter =
        IntCounter::new("watch_poll_cycles_total", "Number of poll cycles executed")
            .expect("metric can not be created");

    pub static ref TXN_BATCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("watch_txn_batches_total", "Transaction batches dispatched, by status"),
        &["status"]
    )
    .expect("metric can not be created");

    pub static ref WATCHED_KEYS: IntGauge =
        IntGauge::new("watch_keys", "Keys currently registered for polling")
            .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

/// Register the crate's metrics on [`REGISTRY`]. Safe to call more than once.
pub fn register_custom_metrics() {
    let _ = REGISTRY.register(Box::new(POLL_CYCLES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(TXN_BATCHES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(WATCHED_KEYS.clone()));
}
