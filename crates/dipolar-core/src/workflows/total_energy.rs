use crate::core::io::report::SampleSink;
use crate::core::models::dipole::{PairTask, PointStore};
use crate::engine::config::PipelineConfig;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::shutdown::{self, AbortHandle, ShutdownSignal};
use crate::engine::state::{Aggregate, EnergyReport};
use crate::engine::tasks::energy_workers::SampleResult;
use crate::engine::tasks::{aggregation, energy_workers, pair_generation};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument, warn};

/// Runs one complete all-pairs evaluation.
///
/// A coordinator is single-use: [`Coordinator::run`] consumes it. Grab an
/// [`AbortHandle`] first if the run may need to be cancelled from elsewhere.
pub struct Coordinator {
    config: PipelineConfig,
    abort: AbortHandle,
    shutdown: ShutdownSignal,
}

/// Counts acknowledged by the producer and worker tasks after shutdown.
#[derive(Debug, Default, Clone, Copy)]
struct StageTally {
    emitted: u64,
    delivered: u64,
    clean: bool,
}

impl Coordinator {
    pub fn new(config: PipelineConfig) -> Self {
        let (abort, shutdown) = shutdown::channel();
        Self {
            config,
            abort,
            shutdown,
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Evaluates every pair of `store`, writing checkpoints and the summary to `sink`.
    ///
    /// The producer and the worker pool run as spawned tasks; the aggregator runs on the
    /// calling task. Whether the aggregator finishes or fails, shutdown is signalled and the
    /// stages are given `shutdown_grace` to wind down before being aborted.
    #[instrument(skip_all, name = "total_energy_workflow")]
    pub async fn run<S: SampleSink + Send + ?Sized>(
        mut self,
        store: Arc<PointStore>,
        reporter: &ProgressReporter<'_>,
        sink: &mut S,
    ) -> Result<EnergyReport, EngineError> {
        let count = store.pair_count();
        let interval = self.config.checkpoint_interval(count);
        info!(
            "Evaluating {} pairs of {} dipoles with {} workers.",
            count,
            store.len(),
            self.config.workers
        );

        reporter.report(Progress::PhaseStart {
            name: "Pair Energies",
        });
        if count == 0 {
            warn!("Fewer than two dipoles loaded; the total energy is zero.");
            reporter.report(Progress::Message(
                "fewer than two dipoles, nothing to evaluate".to_string(),
            ));
        }
        let started = Instant::now();

        let (pair_tx, pair_rx) = mpsc::channel::<PairTask>(self.config.pair_queue_capacity);
        let (result_tx, mut result_rx) =
            mpsc::channel::<SampleResult>(self.config.result_queue_capacity);

        let context = Arc::new(PipelineContext::new(store.clone(), self.config.constants));

        let producer = tokio::spawn(pair_generation::run(
            store,
            pair_tx,
            self.shutdown.clone(),
        ));
        let workers = energy_workers::spawn_pool(
            self.config.workers,
            context.clone(),
            pair_rx,
            result_tx,
            self.shutdown.clone(),
        );

        let outcome = aggregation::run(
            count,
            interval,
            &mut result_rx,
            &mut self.shutdown,
            reporter,
            sink,
            started,
        )
        .await;

        self.abort.abort();
        drop(result_rx);
        let tally = self.join_stages(producer, workers).await;

        let aggregate = outcome?;
        let elapsed = started.elapsed();
        self.verify_completion(count, &aggregate, &tally, &context)?;

        sink.record_summary(aggregate.total, elapsed, context.completed())?;
        sink.flush()?;
        reporter.report(Progress::PhaseFinish);

        info!(
            "DONE {:e} Time {:?} Step {}",
            aggregate.total,
            elapsed,
            context.completed()
        );

        Ok(EnergyReport {
            total: aggregate.total,
            elapsed,
            steps: context.completed(),
            checkpoints: aggregate.checkpoints,
        })
    }

    /// Waits for the producer and every worker, aborting any that outlive the grace period.
    async fn join_stages(
        &self,
        mut producer: JoinHandle<u64>,
        mut workers: JoinSet<u64>,
    ) -> StageTally {
        let mut tally = StageTally {
            clean: true,
            ..Default::default()
        };

        let joined = tokio::time::timeout(self.config.shutdown_grace, async {
            match (&mut producer).await {
                Ok(emitted) => tally.emitted = emitted,
                Err(e) => {
                    warn!("Pair generation task failed: {}", e);
                    tally.clean = false;
                }
            }
            while let Some(worker) = workers.join_next().await {
                match worker {
                    Ok(delivered) => tally.delivered += delivered,
                    Err(e) => {
                        warn!("Energy worker failed: {}", e);
                        tally.clean = false;
                    }
                }
            }
        })
        .await;

        if joined.is_err() {
            warn!(
                "Pipeline stages did not stop within {:?}; aborting {} remaining task(s).",
                self.config.shutdown_grace,
                workers.len() + usize::from(!producer.is_finished())
            );
            producer.abort();
            workers.abort_all();
            while workers.join_next().await.is_some() {}
            tally.clean = false;
        }

        debug!(
            "Stages stopped: {} pairs emitted, {} results delivered.",
            tally.emitted, tally.delivered
        );
        tally
    }

    fn verify_completion(
        &self,
        count: u64,
        aggregate: &Aggregate,
        tally: &StageTally,
        context: &PipelineContext,
    ) -> Result<(), EngineError> {
        if !tally.clean {
            return Err(EngineError::StageFailed {
                stage: "shutdown",
                reason: "producer or worker tasks did not terminate cleanly".to_string(),
            });
        }
        if tally.emitted != count {
            return Err(EngineError::Internal(format!(
                "producer emitted {} pairs, expected {}",
                tally.emitted, count
            )));
        }
        if tally.delivered != count || context.completed() != count || aggregate.received != count
        {
            return Err(EngineError::Internal(format!(
                "expected {} samples, workers delivered {}, sequence reached {}, aggregator received {}",
                count,
                tally.delivered,
                context.completed(),
                aggregate.received
            )));
        }
        Ok(())
    }
}
