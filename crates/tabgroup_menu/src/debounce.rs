use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Delays work until triggers stop arriving for `delay`.
///
/// Each `schedule` call aborts the previous pending timer. Once a timer
/// fires the work is spawned as its own task, so later triggers and
/// `cancel` only ever cut short the wait, never the work itself.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Replaces any pending work with `work`. Must run inside a tokio runtime.
    pub fn schedule<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(work);
        });
        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Drops the pending work, if any. Returns whether a timer was still waiting.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(timer) => {
                let waiting = !timer.is_finished();
                timer.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(runs: Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        async move {
            runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_after_quiet_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(500));

        for _ in 0..5 {
            debouncer.schedule(counting(runs.clone()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(450)).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_triggers_each_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counting(runs.clone()));
        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        debouncer.schedule(counting(runs.clone()));
        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_work() {
        let runs = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule(counting(runs.clone()));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_work_is_not_interrupted() {
        let runs = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(100));

        let slow_runs = runs.clone();
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            slow_runs.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The first timer already fired; rescheduling must not abort its work.
        debouncer.schedule(counting(runs.clone()));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
