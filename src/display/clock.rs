//! Cancelable periodic ticker that drives the spinner animation.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// A repeating task on the ambient tokio runtime.
///
/// Without a runtime the clock stays idle: the display still repaints on
/// every event, only the spinner stops moving.
#[derive(Debug, Default)]
pub struct Clock {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke `on_tick` every `interval` until [`Clock::stop`] is called.
    /// A running ticker is replaced.
    pub fn start<F>(&mut self, interval: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("no tokio runtime available; spinner animation disabled");
                return;
            }
        };

        let interval = interval.max(Duration::from_millis(1));
        let (cancel, mut cancelled) = oneshot::channel::<()>();

        let task = runtime.spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the caller paints frame zero itself.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancelled => break,
                    _ = ticker.tick() => on_tick(),
                }
            }
        });

        tracing::debug!(interval_ms = interval.as_millis() as u64, "clock started");
        self.cancel = Some(cancel);
        self.task = Some(task);
    }

    /// Cancel pending and future ticks. Safe to call at any time, repeatedly.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("clock stopped");
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_interval() {
        let (count, on_tick) = counter();
        let mut clock = Clock::new();
        clock.start(Duration::from_millis(100), on_tick);

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_future_ticks() {
        let (count, on_tick) = counter();
        let mut clock = Clock::new();
        clock.start(Duration::from_millis(100), on_tick);

        time::sleep(Duration::from_millis(250)).await;
        clock.stop();
        let seen = count.load(Ordering::SeqCst);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(!clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_ticker() {
        let (first, first_tick) = counter();
        let (second, second_tick) = counter();
        let mut clock = Clock::new();
        clock.start(Duration::from_millis(100), first_tick);
        clock.start(Duration::from_millis(100), second_tick);

        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut clock = Clock::new();
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
    }

    #[test]
    fn test_start_without_runtime_stays_idle() {
        let (count, on_tick) = counter();
        let mut clock = Clock::new();
        clock.start(Duration::from_millis(10), on_tick);
        assert!(!clock.is_running());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
