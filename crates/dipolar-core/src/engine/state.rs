use std::time::Duration;

/// Result of evaluating one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
    pub first: usize,
    pub second: usize,
    pub raw_dot: f64,
    pub energy: f64,
    /// Completion order, assigned from the shared counter; `1..=count` over a full run.
    pub sequence: u64,
}

/// A sampled progress record taken by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    /// How many samples had been received, including this one.
    pub received: u64,
    pub sequence: u64,
    pub raw_dot: f64,
    pub energy: f64,
    pub elapsed: Duration,
}

impl Checkpoint {
    pub fn percent_complete(&self, count: u64) -> f64 {
        if count == 0 {
            return 100.0;
        }
        self.received as f64 / count as f64 * 100.0
    }
}

/// What the aggregator holds once it has consumed every expected sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub total: f64,
    pub received: u64,
    pub checkpoints: Vec<Checkpoint>,
}

/// Final outcome of a full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    pub total: f64,
    pub elapsed: Duration,
    /// Number of samples processed, equal to `N(N-1)/2`.
    pub steps: u64,
    pub checkpoints: Vec<Checkpoint>,
}
