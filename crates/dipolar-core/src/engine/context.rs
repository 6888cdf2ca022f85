use crate::core::models::dipole::PointStore;
use crate::core::physics::constants::PhysicalConstants;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// State shared by every task of one pipeline run.
///
/// `sequence` is the only cross-task mutable state; everything else is read-only.
#[derive(Debug)]
pub struct PipelineContext {
    pub store: Arc<PointStore>,
    pub constants: PhysicalConstants,
    sequence: AtomicU64,
}

impl PipelineContext {
    pub fn new(store: Arc<PointStore>, constants: PhysicalConstants) -> Self {
        Self {
            store,
            constants,
            sequence: AtomicU64::new(0),
        }
    }

    /// Claims the next completion number. Numbers start at 1 and are never reused.
    #[inline]
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// How many sequence numbers have been handed out so far.
    pub fn completed(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
