//! Consul transactions: operation model, batching and dispatch.
//!
//! A transaction of arbitrary length is cut into batches of at most
//! [`MAX_BATCH_SIZE`](crate::MAX_BATCH_SIZE) operations. Batches are sent
//! concurrently through a [`TxnDispatcher`] and their results are
//! concatenated in batch order. A failing batch does not abort its siblings.

mod ops;
mod partition;
mod service;

pub use ops::*;
pub use partition::*;
pub use service::*;


use async_trait::async_trait;
use futures::future::join_all;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::metrics::TXN_BATCHES_TOTAL;
use crate::Error;
use crate::Result;

/// Result of one operation, as returned by the service
pub type TxnResult = Value;

/// Query parameters of a transaction request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxnQuery {
    /// Target datacenter, the agent's own when absent
    pub dc: Option<String>,
}

impl TxnQuery {
    pub fn datacenter(dc: impl Into<String>) -> Self {
        Self { dc: Some(dc.into()) }
    }

    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        self.dc.iter().map(|dc| ("dc", dc.clone())).collect()
    }
}

/// Executes one batch as a single transaction request.
///
/// Batch-atomic: either every operation yields a result, or the whole call
/// fails. Timeouts, if any, are the implementation's concern.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TxnDispatcher: Send + Sync + 'static {
    async fn dispatch(
        &self,
        batch: Vec<TxnOp>,
        query: &TxnQuery,
    ) -> Result<Vec<TxnResult>>;
}

/// A batch that failed as a unit
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the batch in the partitioned transaction
    pub batch_index: usize,
    /// Number of operations the batch carried
    pub size: usize,
    pub error: Error,
}

/// Merged outcome of a partitioned transaction
#[derive(Debug, Default)]
pub struct TxnOutcome {
    /// Results of all successful batches, in batch order
    pub results: Vec<TxnResult>,
    pub failures: Vec<BatchFailure>,
    /// Number of batches that were dispatched
    pub batches: usize,
}

impl TxnOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Partition `ops`, dispatch every batch concurrently and merge the results.
///
/// An empty `ops` performs no dispatch.
pub async fn create_transaction<D>(
    dispatcher: &D,
    ops: Vec<TxnOp>,
    query: &TxnQuery,
) -> TxnOutcome
where
    D: TxnDispatcher + ?Sized,
{
    let batches = partition(ops);
    let batch_count = batches.len();
    debug!(batches = batch_count, "dispatching transaction");

    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    let responses = join_all(batches.into_iter().map(|batch| dispatcher.dispatch(batch, query))).await;

    let mut outcome = TxnOutcome {
        batches: batch_count,
        ..Default::default()
    };
    for (batch_index, (response, size)) in responses.into_iter().zip(sizes).enumerate() {
        match response {
            Ok(mut results) => {
                TXN_BATCHES_TOTAL.with_label_values(&["success"]).inc();
                if results.len() != size {
                    warn!(
                        batch_index,
                        expected = size,
                        received = results.len(),
                        "transaction batch returned unexpected result count"
                    );
                }
                outcome.results.append(&mut results);
            }
            Err(error) => {
                TXN_BATCHES_TOTAL.with_label_values(&["failure"]).inc();
                warn!(batch_index, size, %error, "transaction batch failed");
                outcome.failures.push(BatchFailure {
                    batch_index,
                    size,
                    error,
                });
            }
        }
    }
    outcome
}
