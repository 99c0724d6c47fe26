//! Debounce timer
//!
//! Each `schedule` call replaces the pending evaluation: the old timer task
//! is aborted and its generation invalidated, so only the newest evaluation
//! can ever fire.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// A single cancellable delayed evaluation
#[derive(Debug)]
pub struct Debouncer {
    /// How long input must be quiet before the evaluation fires
    window: Duration,

    /// Bumped on every schedule/cancel; a timer only fires if it still matches
    generation: Arc<AtomicU64>,

    /// Timer task for the pending evaluation
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run `fire` once the window elapses without another `schedule` or `cancel`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, fire: F) -> u64
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let window = self.window;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!("Debounce generation {} superseded", generation);
                return;
            }
            fire();
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }

        generation
    }

    /// Drop the pending evaluation, if any
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }

    /// True while an evaluation is waiting for its window to elapse
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(previous) = self.pending.get_mut().take() {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&fired);
        let make = move || {
            let fired = Arc::clone(&handle);
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (fired, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_window() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (fired, make) = counter();

        debouncer.schedule(make());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_fire_once() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (fired, make) = counter();

        for _ in 0..10 {
            debouncer.schedule(make());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (fired, make) = counter();

        debouncer.schedule(make());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generations_increase() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let first = debouncer.schedule(|| {});
        let second = debouncer.schedule(|| {});
        assert!(second > first);
    }
}
