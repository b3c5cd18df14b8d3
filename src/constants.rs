// -
// Consul HTTP API paths

/// Version prefix of every Consul HTTP endpoint
pub const CONSUL_VERSION_PATH: &str = "/v1";

/// Transaction endpoint, relative to the version prefix
pub const TXN_SERVICE_PATH: &str = "txn";

/// Key-value endpoint, relative to the version prefix
pub const KV_SERVICE_PATH: &str = "kv";

// -
// Transactions

/// Maximum number of operations Consul accepts in a single transaction
pub const MAX_BATCH_SIZE: usize = 64;

// -
// Watch defaults

/// `last_known_index` of a key that was never successfully observed
pub const UNKNOWN_INDEX: i64 = -1;

pub(crate) const DEFAULT_HOST: &str = "localhost";
pub(crate) const DEFAULT_PORT: u16 = 8500;

pub(crate) const DEFAULT_ITERATION_TIME_MS: u64 = 10 * 1000;
pub(crate) const DEFAULT_LOCK_TIME_MS: u64 = 5 * 60 * 1000;
pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Capacity of the watch event broadcast channel
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 256;
