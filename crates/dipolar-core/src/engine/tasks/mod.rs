//! Pipeline stages and the reference evaluator.
//!
//! Each submodule implements one stage of the all-pairs evaluation. The three pipeline
//! stages communicate only through bounded `tokio::sync::mpsc` queues and observe the same
//! [`ShutdownSignal`](crate::engine::shutdown::ShutdownSignal) at every point where they can
//! suspend. [`direct_sum`] computes the same total without the pipeline and serves as a
//! cross-check.

pub mod aggregation;
pub mod direct_sum;
pub mod energy_workers;
pub mod pair_generation;
