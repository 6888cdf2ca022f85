use crate::core::physics::constants::PhysicalConstants;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Number of concurrently running energy workers.
    pub workers: usize,
    pub pair_queue_capacity: usize,
    pub result_queue_capacity: usize,
    /// Target number of checkpoints written over a run.
    pub write_step: u64,
    /// How long to wait for stages to acknowledge shutdown before aborting them.
    pub shutdown_grace: Duration,
    pub constants: PhysicalConstants,
}

impl PipelineConfig {
    /// Distance, in received samples, between two checkpoints for a run of `count` pairs.
    pub fn checkpoint_interval(&self, count: u64) -> u64 {
        (count / self.write_step.max(1)).max(1)
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    workers: Option<usize>,
    pair_queue_capacity: Option<usize>,
    result_queue_capacity: Option<usize>,
    write_step: Option<u64>,
    shutdown_grace: Option<Duration>,
    constants: Option<PhysicalConstants>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }
    pub fn pair_queue_capacity(mut self, capacity: usize) -> Self {
        self.pair_queue_capacity = Some(capacity);
        self
    }
    pub fn result_queue_capacity(mut self, capacity: usize) -> Self {
        self.result_queue_capacity = Some(capacity);
        self
    }
    pub fn write_step(mut self, step: u64) -> Self {
        self.write_step = Some(step);
        self
    }
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = Some(grace);
        self
    }
    pub fn constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = Some(constants);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let workers = positive(
            "workers",
            self.workers
                .ok_or(ConfigError::MissingParameter("workers"))?,
        )?;
        let pair_queue_capacity = queue_capacity(
            "pair_queue_capacity",
            self.pair_queue_capacity
                .ok_or(ConfigError::MissingParameter("pair_queue_capacity"))?,
        )?;
        let result_queue_capacity = queue_capacity(
            "result_queue_capacity",
            self.result_queue_capacity
                .ok_or(ConfigError::MissingParameter("result_queue_capacity"))?,
        )?;
        let write_step = self
            .write_step
            .ok_or(ConfigError::MissingParameter("write_step"))?;
        if write_step == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "write_step",
                reason: "must be at least 1".to_string(),
            });
        }

        let constants = self.constants.unwrap_or_default();
        if constants.spin_factor == 0.0 || !constants.prefactor().is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "constants",
                reason: format!("energy prefactor is not finite for {:?}", constants),
            });
        }

        Ok(PipelineConfig {
            workers,
            pair_queue_capacity,
            result_queue_capacity,
            write_step,
            shutdown_grace: self.shutdown_grace.unwrap_or(DEFAULT_SHUTDOWN_GRACE),
            constants,
        })
    }
}

fn positive(name: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Bounded queues cannot hold more than a semaphore's permit limit.
fn queue_capacity(name: &'static str, value: usize) -> Result<usize, ConfigError> {
    let value = positive(name, value)?;
    if value > Semaphore::MAX_PERMITS {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must not exceed {}", Semaphore::MAX_PERMITS),
        });
    }
    Ok(value)
}
