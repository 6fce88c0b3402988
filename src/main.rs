use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use waitpool::ThreadPoolInner;

fn main() {
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    let pool = ThreadPoolInner::new(num_cpus::get()).unwrap();
    let executed = Arc::new(AtomicUsize::new(0));

    let now = Instant::now();
    for _ in 0..1_000_000 {
        let executed = Arc::clone(&executed);
        pool.submit(move || {
            executed.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
    }
    pool.wait_until_finished();
    let elapsed = now.elapsed();

    let metrics = pool.metrics();
    log::info!(
        "executed {} tasks on {} workers in {:?} ({:.0} tasks/sec)",
        executed.load(Ordering::Relaxed),
        metrics.num_threads,
        elapsed,
        metrics.completed_tasks as f64 / elapsed.as_secs_f64(),
    );

    pool.shutdown();
}
