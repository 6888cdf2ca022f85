//! High-level entry points that run complete evaluations.
//!
//! [`total_energy`] wires the engine stages together: it sizes the queues from the
//! [`PipelineConfig`](crate::engine::config::PipelineConfig), spawns the producer and the
//! worker pool, drives the aggregator on the caller's task, and owns the shutdown that
//! follows.

pub mod total_energy;
