use std::sync::{Condvar, Mutex};

/// Count of submitted-but-unfinished tasks with a wait-for-zero barrier.
///
/// This is its own lock domain. Pool code never holds this lock together
/// with the queue lock, in either order.
pub struct CompletionTracker {
    count: Mutex<usize>,
    all_done: Condvar,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            all_done: Condvar::new(),
        }
    }

    /// Counts one task in. Must happen before the task becomes visible to
    /// any worker.
    pub fn increment(&self) {
        let mut count = self.count.lock().expect("completion count lock poisoned");
        *count += 1;
    }

    /// Counts one task out after its body has returned, normally or by panic.
    ///
    /// Panics on underflow: a decrement without a matching increment means a
    /// task was counted twice, which is unrecoverable bookkeeping corruption.
    pub fn decrement(&self) {
        let mut count = self.count.lock().expect("completion count lock poisoned");
        assert!(
            *count > 0,
            "completion count underflow: a task finished twice"
        );
        *count -= 1;
        if *count == 0 {
            self.all_done.notify_all();
        }
    }

    /// Blocks until the count is momentarily zero. Returns immediately when
    /// nothing is pending. Any number of threads may wait concurrently; all
    /// of them are released when the count reaches zero.
    ///
    /// "Momentarily" is deliberate: a submission racing with the wakeup may
    /// have pushed the count back up by the time a waiter resumes.
    pub fn wait(&self) {
        let mut count = self.count.lock().expect("completion count lock poisoned");
        while *count > 0 {
            count = self
                .all_done
                .wait(count)
                .expect("completion count lock poisoned");
        }
    }

    #[inline]
    pub fn pending(&self) -> usize {
        *self.count.lock().expect("completion count lock poisoned")
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}
