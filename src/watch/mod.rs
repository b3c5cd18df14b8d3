//! Watch engine: keeps a registry of watched keys and re-reads the unlocked
//! ones on a fixed interval.
//!
//! ```text
//! Scheduler tick
//!   -> unlock keys whose lock expired
//!   -> one `get` per unlocked key
//!   -> partition into batches of MAX_BATCH_SIZE
//!   -> dispatch batches concurrently
//!   -> merge results, publish WatchEvent
//! ```

mod engine;
mod event;
mod poll;
mod registry;
mod scheduler;
mod state;

pub use engine::*;
pub use event::*;
pub use poll::*;
pub use registry::*;
pub use scheduler::*;
pub use state::*;

#[cfg(test)]
mod registry_test;
