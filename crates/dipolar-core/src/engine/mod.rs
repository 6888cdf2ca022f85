//! # Engine Module
//!
//! The concurrent pair-generation → computation → aggregation pipeline.
//!
//! ## Overview
//!
//! A full evaluation enumerates all `N(N-1)/2` unique pairs of dipoles, evaluates each
//! pair independently, and sums the results. The engine runs this as three stages joined
//! by bounded queues:
//!
//! - **Pair generation** ([`tasks::pair_generation`]) - a single producer emitting pairs in
//!   lexicographic `(i, j)` order
//! - **Energy workers** ([`tasks::energy_workers`]) - a fixed-size pool evaluating pairs and
//!   stamping each result with a sequence number from the shared atomic counter
//! - **Aggregation** ([`tasks::aggregation`]) - a fixed-count consumer accumulating the total
//!   and sampling checkpoints for progress output
//!
//! Full queues suspend the stage upstream of them, so memory stays bounded regardless of
//! `N`. Every suspension point also watches the [`shutdown`] signal, which lets a run be
//! aborted without deadlocking on a full queue.
//!
//! ## Shared State
//!
//! The [`context::PipelineContext`] owns the only cross-task mutable state: the atomic
//! sequence counter. The point store is read-only and shared through an `Arc`; the running
//! total belongs to the aggregator alone.

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod shutdown;
pub mod state;
pub mod tasks;
