use crate::core::models::dipole::{PairTask, PointStore};
use crate::engine::shutdown::ShutdownSignal;
use itertools::Itertools;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// All index pairs `(i, j)` with `0 <= i < j < n`, in lexicographic order.
pub fn index_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).tuple_combinations()
}

/// Feeds every pair of `store` into `pairs`, returning how many were sent.
///
/// Suspends while the queue is full. Stops early, without error, when shutdown is requested
/// or when every receiver has gone away; it never signals shutdown itself.
#[instrument(skip_all, name = "pair_generation_task")]
pub async fn run(
    store: Arc<PointStore>,
    pairs: mpsc::Sender<PairTask>,
    mut shutdown: ShutdownSignal,
) -> u64 {
    let mut emitted = 0u64;

    for (i, j) in index_pairs(store.len()) {
        let Some(task) = store.pair_task(i, j) else {
            break;
        };

        tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                debug!("Shutdown requested after emitting {} pairs.", emitted);
                return emitted;
            }
            sent = pairs.send(task) => {
                if sent.is_err() {
                    debug!("Pair queue closed after emitting {} pairs.", emitted);
                    return emitted;
                }
            }
        }
        emitted += 1;
    }

    debug!("Emitted all {} pairs.", emitted);
    emitted
}
