use crate::core::models::dipole::PairTask;
use crate::core::physics::dipole::dipole_dipole;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::shutdown::ShutdownSignal;
use crate::engine::state::EnergySample;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, trace};

/// What a worker hands to the aggregator: a sample, or the error that stopped a pair.
pub type SampleResult = Result<EnergySample, EngineError>;

/// Evaluates one pair and stamps the result with the next sequence number.
///
/// The sequence number is claimed after the energy is computed, so it reflects completion
/// order across the pool. Failed pairs do not consume a number.
pub fn evaluate(context: &PipelineContext, task: &PairTask) -> SampleResult {
    let pair = dipole_dipole(&task.r1, &task.m1, &task.r2, &task.m2, &context.constants)
        .map_err(|source| EngineError::Interaction {
            first: task.first,
            second: task.second,
            source,
        })?;

    Ok(EnergySample {
        first: task.first,
        second: task.second,
        raw_dot: pair.raw_dot,
        energy: pair.energy,
        sequence: context.next_sequence(),
    })
}

/// Starts `workers` tasks that share one pair queue and one result queue.
///
/// Each task resolves to the number of results it delivered. The pool size is the bound on
/// concurrent evaluation; pairs never get a task of their own.
pub fn spawn_pool(
    workers: usize,
    context: Arc<PipelineContext>,
    pairs: mpsc::Receiver<PairTask>,
    results: mpsc::Sender<SampleResult>,
    shutdown: ShutdownSignal,
) -> JoinSet<u64> {
    let pairs = Arc::new(Mutex::new(pairs));
    let mut pool = JoinSet::new();

    for worker_id in 0..workers {
        pool.spawn(run_worker(
            worker_id,
            context.clone(),
            pairs.clone(),
            results.clone(),
            shutdown.clone(),
        ));
    }

    debug!("Spawned {} energy workers.", workers);
    pool
}

async fn run_worker(
    worker_id: usize,
    context: Arc<PipelineContext>,
    pairs: Arc<Mutex<mpsc::Receiver<PairTask>>>,
    results: mpsc::Sender<SampleResult>,
    mut shutdown: ShutdownSignal,
) -> u64 {
    let mut delivered = 0u64;

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            next = next_pair(&pairs) => next,
        };
        let Some(task) = next else {
            break;
        };

        let outcome = evaluate(&context, &task);
        let failed = outcome.is_err();

        tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            sent = results.send(outcome) => {
                if sent.is_err() {
                    break;
                }
            }
        }
        delivered += 1;

        // The aggregator aborts the run on the first error it sees.
        if failed {
            break;
        }
    }

    trace!(worker_id, delivered, "Energy worker exiting.");
    delivered
}

async fn next_pair(pairs: &Mutex<mpsc::Receiver<PairTask>>) -> Option<PairTask> {
    pairs.lock().await.recv().await
}
