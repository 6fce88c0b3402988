use super::{
    errors::PoolError,
    model::PoolMetrics,
    report::{LogFailureHandler, TaskFailureHandler},
    tracker::CompletionTracker,
};
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
};

use crossbeam::channel::{self, Receiver, Sender};

/// A unit of fire-and-forget work. Moved into the queue once, executed
/// exactly once, no result visible to the submitter.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Thread pool configuration.
#[derive(Clone)]
pub struct Config {
    /// Number of worker threads, fixed for the lifetime of the pool.
    pub num_threads: usize,
    /// Name prefix for worker threads, suffixed with the worker index.
    pub thread_name: String,
    /// Worker stack size in bytes; the platform default when unset.
    pub stack_size: Option<usize>,
    /// Where uncaught task panics are reported.
    pub failure_handler: Arc<dyn TaskFailureHandler>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get().max(1),
            thread_name: "waitpool-worker".into(),
            stack_size: None,
            failure_handler: Arc::new(LogFailureHandler),
        }
    }
}

impl Config {
    /// One worker thread. Tasks execute strictly in submission order.
    pub fn single_threaded() -> Self {
        Self {
            num_threads: 1,
            ..Default::default()
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("num_threads", &self.num_threads)
            .field("thread_name", &self.thread_name)
            .field("stack_size", &self.stack_size)
            .finish_non_exhaustive()
    }
}

pub type ThreadPool = Arc<ThreadPoolInner>;

/// State shared between the pool handle and the workers.
///
/// Workers hold only this, never the pool itself, so dropping the last
/// `ThreadPool` handle disconnects the queue and lets every worker exit.
struct Shared {
    tracker: CompletionTracker,
    total_submitted: AtomicUsize,
    completed_tasks: AtomicUsize,
    failed_tasks: AtomicUsize,
    failure_handler: Arc<dyn TaskFailureHandler>,
}

impl Shared {
    fn run_worker(&self, queue: Receiver<Task>) {
        let this = thread::current();
        let name = this.name().unwrap_or("waitpool-worker");
        log::trace!("{name} started");

        // recv() keeps draining queued messages in FIFO order after the
        // sender side disconnects and only then reports an error, which is
        // exactly the "stop AND queue empty" exit condition.
        while let Ok(task) = queue.recv() {
            match panic::catch_unwind(AssertUnwindSafe(move || task())) {
                Ok(()) => {
                    self.completed_tasks.fetch_add(1, Ordering::Relaxed);
                    self.tracker.decrement();
                }
                Err(payload) => {
                    self.failed_tasks.fetch_add(1, Ordering::Relaxed);
                    // Decrement before reporting so a slow handler cannot
                    // stall threads blocked on the completion barrier.
                    self.tracker.decrement();

                    let handler = &self.failure_handler;
                    let report = panic::catch_unwind(AssertUnwindSafe(|| {
                        handler.on_task_panic(name, payload.as_ref());
                    }));
                    if report.is_err() {
                        log::error!("task failure handler panicked, report dropped");
                    }
                }
            }
        }

        log::trace!("{name} exiting");
    }
}

/// Fixed-size pool of OS worker threads executing fire-and-forget tasks.
///
/// Typically used through the [`ThreadPool`] alias so that tasks themselves
/// can hold a handle and submit more work.
pub struct ThreadPoolInner {
    /// Producer side of the task queue. `None` once shutdown has begun.
    injector: Mutex<Option<Sender<Task>>>,
    /// Extra consumer handle, used only for queue-depth metrics. Receivers
    /// do not delay disconnection, so this never keeps workers alive.
    queue: Receiver<Task>,
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    config: Config,
}

impl ThreadPoolInner {
    /// Builds a pool with `num_threads` workers and default settings.
    pub fn new(num_threads: usize) -> Result<ThreadPool, PoolError> {
        Self::with_config(Config {
            num_threads,
            ..Default::default()
        })
    }

    /// Builds a pool and eagerly spawns every worker.
    ///
    /// If the OS refuses to spawn any of them, the workers that did start
    /// are wound down and joined before the error is returned; a pool is
    /// never left partially constructed.
    pub fn with_config(config: Config) -> Result<ThreadPool, PoolError> {
        assert!(
            config.num_threads > 0,
            "thread pool needs at least one worker"
        );

        let (tx, rx) = channel::unbounded::<Task>();
        let shared = Arc::new(Shared {
            tracker: CompletionTracker::new(),
            total_submitted: AtomicUsize::new(0),
            completed_tasks: AtomicUsize::new(0),
            failed_tasks: AtomicUsize::new(0),
            failure_handler: Arc::clone(&config.failure_handler),
        });

        let mut workers = Vec::with_capacity(config.num_threads);
        for i in 0..config.num_threads {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name, i));
            if let Some(size) = config.stack_size {
                builder = builder.stack_size(size);
            }

            let shared = Arc::clone(&shared);
            let queue = rx.clone();
            match builder.spawn(move || shared.run_worker(queue)) {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    // Disconnect the queue so the workers spawned so far
                    // exit, then join them before reporting the failure.
                    drop(tx);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(PoolError::Spawn(err));
                }
            }
        }

        log::debug!("thread pool started with {} workers", config.num_threads);

        Ok(Arc::new(ThreadPoolInner {
            injector: Mutex::new(Some(tx)),
            queue: rx,
            shared,
            workers: Mutex::new(workers),
            config,
        }))
    }

    /// Queues a task for execution. Fire-and-forget: no result, no handle,
    /// and a panic inside `f` goes to the failure handler instead of
    /// reaching the submitter.
    ///
    /// Safe to call from any thread, including from inside a task already
    /// running on this pool. Fails only once [`shutdown`](Self::shutdown)
    /// has begun.
    pub fn submit<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let injector = self.injector.lock().expect("injector lock poisoned");
        let sender = injector.as_ref().ok_or(PoolError::ShuttingDown)?;

        // Count the task in before it becomes visible to any worker.
        self.shared.tracker.increment();
        self.shared.total_submitted.fetch_add(1, Ordering::Relaxed);

        sender
            .send(Box::new(f))
            .expect("task queue disconnected while the pool holds a sender");
        Ok(())
    }

    /// Blocks until every submitted task has finished.
    ///
    /// Returns immediately when nothing is pending, so calling it twice in
    /// a row is cheap. If other threads keep submitting concurrently, this
    /// returns at a moment the pending count touched zero, nothing more.
    pub fn wait_until_finished(&self) {
        self.shared.tracker.wait();
    }

    /// Stops accepting work, drains tasks that were already queued and
    /// joins every worker thread. Idempotent: a second call finds nothing
    /// to do.
    ///
    /// Panics when called from one of the pool's own worker threads, since
    /// joining the calling thread would deadlock forever.
    pub fn shutdown(&self) {
        let sender = self.injector.lock().expect("injector lock poisoned").take();
        if sender.is_some() {
            log::debug!("thread pool shutting down, draining queued tasks");
        }
        // Dropping the last sender disconnects the channel; workers finish
        // whatever is queued and exit.
        drop(sender);

        let workers = {
            let mut workers = self.workers.lock().expect("worker list lock poisoned");
            std::mem::take(&mut *workers)
        };

        let caller = thread::current().id();
        for handle in workers {
            assert_ne!(
                handle.thread().id(),
                caller,
                "shutdown() called from a pool worker thread"
            );
            if handle.join().is_err() {
                log::error!("worker thread terminated abnormally");
            }
        }
    }

    /// Runs `f` with a fresh [`Scope`] and waits for every task spawned
    /// through it before returning.
    pub fn scoped<T, F>(self: &Arc<Self>, f: F) -> T
    where
        F: FnOnce(&Scope) -> T,
    {
        let scope = Scope::new(Arc::clone(self));
        let out = f(&scope);
        scope.wait();
        out
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            pending_tasks: self.shared.tracker.pending(),
            queued_tasks: self.queue.len(),
            total_submitted: self.shared.total_submitted.load(Ordering::Relaxed),
            completed_tasks: self.shared.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.shared.failed_tasks.load(Ordering::Relaxed),
            num_threads: self.config.num_threads,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for ThreadPoolInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Completion scope over a shared pool.
///
/// Tracks the tasks spawned through it with its own barrier, so independent
/// batches can each wait for just their own work while sharing the same
/// worker threads.
pub struct Scope {
    tracker: Arc<CompletionTracker>,
    pool: ThreadPool,
}

struct CompletionGuard {
    tracker: Arc<CompletionTracker>,
}

impl Drop for CompletionGuard {
    // Runs during unwinding too, so a panicking task still checks out.
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}

impl Scope {
    pub fn new(pool: ThreadPool) -> Self {
        Self {
            tracker: Arc::new(CompletionTracker::new()),
            pool,
        }
    }

    /// Submits a task counted against this scope as well as the pool.
    pub fn spawn<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tracker.increment();
        let guard = CompletionGuard {
            tracker: Arc::clone(&self.tracker),
        };
        // If the pool refuses the task the closure is dropped unexecuted
        // and the guard rolls the count back.
        self.pool.submit(move || {
            let _done = guard;
            f();
        })
    }

    /// Blocks until every task spawned through this scope has finished.
    /// Tasks submitted to the pool outside this scope are not waited on.
    pub fn wait(&self) {
        self.tracker.wait();
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }
}
