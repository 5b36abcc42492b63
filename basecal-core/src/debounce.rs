//! Refresh debouncing.
//!
//! Every trigger cancels the pending timer and starts a new one, so a burst of
//! changes produces a single refresh once the vault has been quiet for the
//! whole delay. A steady stream of changes closer together than the delay
//! postpones the refresh for as long as it lasts.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period before a file change triggers a refresh.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(120);

pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    fire: mpsc::UnboundedSender<()>,
}

impl Debouncer {
    /// Returns the debouncer and the receiver that yields once per quiet period.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (fire, rx) = mpsc::unbounded_channel();
        (
            Debouncer {
                delay,
                pending: None,
                fire,
            },
            rx,
        )
    }

    /// Restart the timer. Must be called inside a tokio runtime.
    pub fn trigger(&mut self) {
        self.cancel();

        let delay = self.delay;
        let fire = self.fire.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fire.send(());
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    async fn settle() {
        // Let spawned timers observe the advanced clock.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once() {
        let (mut debouncer, mut rx) = Debouncer::new(REFRESH_DEBOUNCE);

        for _ in 0..5 {
            debouncer.trigger();
            settle().await;
            advance(Duration::from_millis(50)).await;
            settle().await;
        }
        assert!(rx.try_recv().is_err());

        advance(Duration::from_millis(120)).await;
        settle().await;
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_fire_separately() {
        let (mut debouncer, mut rx) = Debouncer::new(REFRESH_DEBOUNCE);

        debouncer.trigger();
        settle().await;
        advance(Duration::from_millis(130)).await;
        settle().await;
        debouncer.trigger();
        settle().await;
        advance(Duration::from_millis(130)).await;
        settle().await;

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_refresh() {
        let (mut debouncer, mut rx) = Debouncer::new(REFRESH_DEBOUNCE);
        debouncer.trigger();
        assert!(debouncer.is_pending());
        drop(debouncer);

        advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(rx.recv().await.is_none());
    }
}
