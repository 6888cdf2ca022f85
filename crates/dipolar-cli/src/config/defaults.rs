use std::thread;

pub struct DefaultsConfig {
    pub workers: usize,
    pub pair_queue_capacity: usize,
    pub result_queue_capacity: usize,
    pub write_step: u64,
    pub shutdown_grace_ms: u64,
    pub skip_malformed: bool,
}

impl DefaultsConfig {
    /// Defaults for a run; the worker pool follows `-j` when it is given.
    pub fn with_threads(threads: Option<usize>) -> Self {
        let workers = threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        Self {
            workers,
            ..Self::default()
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            pair_queue_capacity: 10_000,
            result_queue_capacity: 10_000,
            write_step: 100,
            shutdown_grace_ms: 2_000,
            skip_malformed: false,
        }
    }
}
