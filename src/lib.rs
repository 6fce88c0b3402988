//! Fixed-size blocking thread pool with a wait-until-finished barrier
//!
//! # Features
//! - Fire-and-forget submission from any number of producer threads
//! - FIFO task queue drained by a fixed set of OS worker threads
//! - Completion barrier: block until every submitted task has finished
//! - Panic containment: a failing task never kills a worker or corrupts the barrier
//! - Graceful shutdown that drains already-queued work before joining
//! - Scoped batches that wait on just their own tasks
//! - Injected failure reporting with a `log`-backed default

pub mod errors;
pub mod model;
pub mod pool;
pub mod report;
pub mod tracker;

pub use pool::{Config, Scope, Task, ThreadPool, ThreadPoolInner};
pub use tracker::CompletionTracker;
