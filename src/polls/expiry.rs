//! One-shot expiry timers for open polls.
//!
//! Each armed chat gets its own detached tokio task that sleeps for the poll
//! window and then runs the finalize callback. Timers are independent: a
//! firing timer never stalls vote intake or other chats. Delivery is
//! at-least-once; the caller's finalize-once guard fences duplicates.

use super::record::ChatId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Per-chat one-shot timers.
#[derive(Debug, Default)]
pub struct ExpiryScheduler {
    timers: Arc<Mutex<HashMap<ChatId, JoinHandle<()>>>>,
}

impl ExpiryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `on_expire` to run no earlier than `after` from now.
    ///
    /// Re-arming a chat replaces (and aborts) its pending timer. The task
    /// deregisters itself before invoking the callback, so a `cancel` issued
    /// from inside the callback is a no-op rather than a self-abort.
    pub fn arm<F, Fut>(&self, chat_id: ChatId, after: Duration, on_expire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // Hold the guard across spawn + insert so the task's deregistration
        // cannot observe the map before its own handle is in it.
        let mut timers = self.timers.lock();
        let registry = Arc::clone(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            registry.lock().remove(&chat_id);
            on_expire().await;
        });
        if let Some(previous) = timers.insert(chat_id, handle) {
            previous.abort();
        }
    }

    /// Cancel the chat's pending timer, if any.
    ///
    /// Idempotent, and safe after the timer already fired.
    pub fn cancel(&self, chat_id: ChatId) {
        if let Some(handle) = self.timers.lock().remove(&chat_id) {
            handle.abort();
        }
    }

    /// Number of chats with a pending timer.
    #[cfg(test)]
    fn armed_count(&self) -> usize {
        self.timers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_arm_fires_once() {
        let scheduler = ExpiryScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.arm(-100, Duration::from_millis(20), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_prevents_fire() {
        let scheduler = ExpiryScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.arm(-100, Duration::from_millis(50), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel(-100);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_after_fire_is_noop() {
        let scheduler = ExpiryScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.arm(-100, Duration::from_millis(20), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.cancel(-100);
        scheduler.cancel(-100);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rearm_replaces_pending_timer() {
        let scheduler = ExpiryScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let first = Arc::clone(&fired);
        scheduler.arm(-100, Duration::from_millis(40), move || async move {
            first.fetch_add(10, Ordering::SeqCst);
        });
        let second = Arc::clone(&fired);
        scheduler.arm(-100, Duration::from_millis(20), move || async move {
            second.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timers_are_independent_per_chat() {
        let scheduler = ExpiryScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for chat_id in [-100, -200, -300] {
            let counter = Arc::clone(&fired);
            scheduler.arm(chat_id, Duration::from_millis(20), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        scheduler.cancel(-200);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
