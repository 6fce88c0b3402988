/// Point-in-time snapshot of pool activity.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Tasks submitted but not yet finished (queued + in flight).
    pub pending_tasks: usize,
    /// Tasks sitting in the queue, not yet picked up by a worker.
    pub queued_tasks: usize,
    pub total_submitted: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub num_threads: usize,
}

impl PoolMetrics {
    /// Tasks currently being executed by workers.
    ///
    /// Derived from two independently sampled counters, so the value can be
    /// briefly stale under concurrent load.
    pub fn in_flight(&self) -> usize {
        self.pending_tasks.saturating_sub(self.queued_tasks)
    }

    pub fn is_idle(&self) -> bool {
        self.pending_tasks == 0
    }

    pub fn success_rate(&self) -> f64 {
        let finished = self.completed_tasks + self.failed_tasks;
        if finished == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / finished as f64
    }
}
