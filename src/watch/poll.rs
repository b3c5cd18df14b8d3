use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

use super::WatchEvent;
use super::WatchRegistry;
use crate::metrics::POLL_CYCLES_TOTAL;
use crate::txn::create_transaction;
use crate::TxnDispatcher;
use crate::TxnOp;
use crate::TxnOutcome;
use crate::TxnQuery;

/// What a single poll cycle did
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// Keys whose lock expired at the start of the cycle
    pub unlocked: usize,
    /// Keys included in the transaction
    pub polled: usize,
    pub txn: TxnOutcome,
}

/// Unlock due keys, read every unlocked key through one partitioned
/// transaction and publish the merged outcome.
///
/// Results are not written back into the registry.
pub(crate) async fn poll_cycle<D>(
    registry: &WatchRegistry,
    dispatcher: &D,
    query: &TxnQuery,
    events: &broadcast::Sender<WatchEvent>,
) -> PollOutcome
where
    D: TxnDispatcher + ?Sized,
{
    POLL_CYCLES_TOTAL.inc();
    let now = Instant::now();
    let unlocked = registry.transition_all(now);

    let ops: Vec<TxnOp> = registry
        .eligible_keys()
        .into_iter()
        .map(TxnOp::kv_get)
        .collect();
    let polled = ops.len();
    debug!(polled, unlocked, "poll cycle started");

    let txn = create_transaction(dispatcher, ops, query).await;

    if events.receiver_count() > 0 {
        for failure in &txn.failures {
            let _ = events.send(WatchEvent::BatchFailed {
                batch_index: failure.batch_index,
                size: failure.size,
                error: failure.error.to_string(),
            });
        }
        let _ = events.send(WatchEvent::CycleCompleted {
            polled,
            results: txn.results.clone(),
            failed_batches: txn.failures.len(),
        });
    }
    debug!(
        polled,
        results = txn.results.len(),
        failed_batches = txn.failures.len(),
        "poll cycle completed"
    );

    PollOutcome {
        unlocked,
        polled,
        txn,
    }
}
