use std::any::Any;

/// Reporting capability for tasks that panic on a worker thread.
///
/// The pool never propagates task panics to the submitter. The completion
/// bookkeeping is performed first, then the payload is handed here.
/// Implementations should be cheap; a handler that blocks stalls one worker.
pub trait TaskFailureHandler: Send + Sync {
    fn on_task_panic(&self, worker: &str, payload: &(dyn Any + Send));
}

/// Default handler: emits the panic through the `log` facade.
///
/// With no logger installed every emission is a no-op, so the pool behaves
/// identically when nobody consumes the reports.
pub struct LogFailureHandler;

impl TaskFailureHandler for LogFailureHandler {
    fn on_task_panic(&self, worker: &str, payload: &(dyn Any + Send)) {
        log::error!("task panicked on {}: {}", worker, panic_message(payload));
    }
}

/// Best-effort extraction of the human-readable part of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<opaque panic payload>"
    }
}
