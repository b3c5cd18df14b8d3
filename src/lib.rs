//! # consul-watch
//!
//! Client-side watch engine for a Consul key-value store.
//!
//! Registered keys are re-read on a fixed interval through batched
//! `/v1/txn` transactions. Each key carries a lock state so that a key which
//! is cooling down is skipped until its lock expires.
//!
//! The crate does not perform HTTP itself: plug a transport in through
//! [`request::RequestHandler`] (wrapped by [`TxnService`]), or implement
//! [`TxnDispatcher`] directly. [`KvService`] covers plain single-key
//! reads, writes and deletes over the same transport.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use consul_watch::{Settings, WatchEngine};
//!
//! let settings = Settings::load(None)?;
//! let engine = WatchEngine::from_settings(&settings, Arc::new(MyHttpHandler::default()));
//! engine.register_keys(["app-1/SERVICES/logger/LOGGER_ENABLED"]);
//! engine.start();
//! ```

mod config;
mod constants;
mod errors;
mod kv;
mod txn;
mod watch;

pub mod metrics;
pub mod request;

pub use self::config::*;
pub use constants::*;
pub use errors::*;
pub use kv::*;
pub use txn::*;
pub use watch::*;
