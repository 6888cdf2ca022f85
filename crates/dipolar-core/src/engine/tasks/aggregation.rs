use super::energy_workers::SampleResult;
use crate::core::io::report::SampleSink;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::shutdown::ShutdownSignal;
use crate::engine::state::{Aggregate, Checkpoint};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Receives exactly `count` results and accumulates their energies.
///
/// A checkpoint is taken whenever the number received is a multiple of `interval`, and
/// always for the final sample, so the last checkpoint corresponds to the last result.
/// Checkpoints are based on how many results arrived, never on which pair they belong to,
/// because completion order is not generation order.
///
/// Returns early with the first pair error, with [`EngineError::Cancelled`] if shutdown is
/// requested, or with an internal error if the queue closes before `count` results arrive.
#[instrument(skip_all, name = "aggregation_task", fields(count = count))]
pub async fn run<S: SampleSink + ?Sized>(
    count: u64,
    interval: u64,
    results: &mut mpsc::Receiver<SampleResult>,
    shutdown: &mut ShutdownSignal,
    reporter: &ProgressReporter<'_>,
    sink: &mut S,
    started: Instant,
) -> Result<Aggregate, EngineError> {
    let interval = interval.max(1);
    let mut aggregate = Aggregate::default();
    let mut last_reported = 0u64;

    reporter.report(Progress::TaskStart { total: count });

    while aggregate.received < count {
        let next = tokio::select! {
            biased;
            _ = shutdown.triggered() => {
                return Err(EngineError::Cancelled {
                    received: aggregate.received,
                    expected: count,
                });
            }
            next = results.recv() => next,
        };

        let sample = match next {
            Some(Ok(sample)) => sample,
            Some(Err(e)) => return Err(e),
            None => {
                return Err(EngineError::Internal(format!(
                    "result queue closed after {} of {} samples",
                    aggregate.received, count
                )));
            }
        };

        aggregate.received += 1;
        aggregate.total += sample.energy;

        if aggregate.received % interval == 0 || aggregate.received == count {
            let checkpoint = Checkpoint {
                received: aggregate.received,
                sequence: sample.sequence,
                raw_dot: sample.raw_dot,
                energy: sample.energy,
                elapsed: started.elapsed(),
            };
            let percent = checkpoint.percent_complete(count);
            info!("{} % {:?}", percent, checkpoint.elapsed);

            sink.record_sample(checkpoint.sequence, checkpoint.raw_dot, checkpoint.energy)?;

            reporter.report(Progress::TaskIncrement {
                amount: aggregate.received - last_reported,
            });
            reporter.report(Progress::StatusUpdate {
                text: format!("{:.1}%", percent),
            });
            last_reported = aggregate.received;
            aggregate.checkpoints.push(checkpoint);
        }
    }

    reporter.report(Progress::TaskFinish);
    debug!(
        "Aggregated {} samples into {} checkpoints.",
        aggregate.received,
        aggregate.checkpoints.len()
    );
    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::report::ReportWriter;
    use crate::core::physics::dipole::InteractionError;
    use crate::engine::shutdown;
    use crate::engine::state::EnergySample;
    use std::time::Duration;

    fn sample(sequence: u64, energy: f64) -> SampleResult {
        Ok(EnergySample {
            first: 0,
            second: 1,
            raw_dot: 1.0,
            energy,
            sequence,
        })
    }

    async fn aggregate_samples(
        samples: Vec<SampleResult>,
        count: u64,
        interval: u64,
    ) -> (Result<Aggregate, EngineError>, String) {
        let (tx, mut rx) = mpsc::channel(samples.len().max(1));
        for s in samples {
            tx.send(s).await.unwrap();
        }
        drop(tx);

        let (_handle, mut signal) = shutdown::channel();
        let mut sink = ReportWriter::new(Vec::new());
        let result = run(
            count,
            interval,
            &mut rx,
            &mut signal,
            &ProgressReporter::new(),
            &mut sink,
            Instant::now(),
        )
        .await;
        (result, String::from_utf8(sink.into_inner()).unwrap())
    }

    #[tokio::test]
    async fn sums_exactly_count_samples() {
        let samples = (1..=10).map(|i| sample(i, i as f64)).collect();
        let (result, _) = aggregate_samples(samples, 10, 1).await;
        let aggregate = result.unwrap();

        assert_eq!(aggregate.received, 10);
        assert_eq!(aggregate.total, 55.0);
    }

    #[tokio::test]
    async fn checkpoints_follow_interval_and_end_on_last_sample() {
        // 10 samples, interval 3: checkpoints at 3, 6, 9 and the final 10th.
        let samples = (1..=10).map(|i| sample(100 + i, 1.0)).collect();
        let (result, report) = aggregate_samples(samples, 10, 3).await;
        let aggregate = result.unwrap();

        let received: Vec<_> = aggregate.checkpoints.iter().map(|c| c.received).collect();
        assert_eq!(received, vec![3, 6, 9, 10]);
        assert_eq!(aggregate.checkpoints.last().unwrap().sequence, 110);

        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("103\t"));
        assert!(lines[3].starts_with("110\t"));
    }

    #[tokio::test]
    async fn divisible_count_has_no_extra_final_checkpoint() {
        let samples = (1..=12).map(|i| sample(i, 1.0)).collect();
        let (result, _) = aggregate_samples(samples, 12, 4).await;
        assert_eq!(result.unwrap().checkpoints.len(), 3);
    }

    #[tokio::test]
    async fn zero_interval_is_treated_as_every_sample() {
        let samples = (1..=3).map(|i| sample(i, 1.0)).collect();
        let (result, _) = aggregate_samples(samples, 3, 0).await;
        assert_eq!(result.unwrap().checkpoints.len(), 3);
    }

    #[tokio::test]
    async fn zero_count_finishes_immediately() {
        let (result, report) = aggregate_samples(Vec::new(), 0, 1).await;
        let aggregate = result.unwrap();
        assert_eq!(aggregate.received, 0);
        assert_eq!(aggregate.total, 0.0);
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn first_pair_error_is_returned() {
        let samples = vec![
            sample(1, 1.0),
            Err(EngineError::Interaction {
                first: 2,
                second: 5,
                source: InteractionError::Coincident,
            }),
            sample(2, 1.0),
        ];
        let (result, _) = aggregate_samples(samples, 3, 1).await;
        assert!(matches!(
            result,
            Err(EngineError::Interaction {
                first: 2,
                second: 5,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn early_close_is_an_internal_error() {
        let samples = vec![sample(1, 1.0)];
        let (result, _) = aggregate_samples(samples, 5, 1).await;
        assert!(matches!(result, Err(EngineError::Internal(_))));
    }

    #[tokio::test]
    async fn shutdown_cancels_waiting_aggregator() {
        let (_tx, mut rx) = mpsc::channel::<SampleResult>(1);
        let (handle, mut signal) = shutdown::channel();
        let mut sink = ReportWriter::new(Vec::new());

        let aborter = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.abort();
        });

        let result = run(
            4,
            1,
            &mut rx,
            &mut signal,
            &ProgressReporter::new(),
            &mut sink,
            Instant::now(),
        )
        .await;
        aborter.await.unwrap();

        assert!(matches!(
            result,
            Err(EngineError::Cancelled {
                received: 0,
                expected: 4
            })
        ));
    }
}
