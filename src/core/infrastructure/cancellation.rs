//! Cooperative cancellation shared by a scrape cycle and its requests.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// A cancellation signal with an optional deadline.
///
/// Clones share state: cancelling one clone cancels them all. The signal
/// fires either when [`Cancellation::cancel`] is called or when the deadline
/// passes, whichever comes first.
#[derive(Debug, Clone)]
pub struct Cancellation {
    deadline: Option<Instant>,
    flag: Arc<watch::Sender<bool>>,
}

impl Cancellation {
    /// A signal that only fires on an explicit `cancel()`.
    pub fn never() -> Self {
        Self::build(None)
    }

    /// A signal that fires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(Instant::now() + timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            deadline,
            flag: Arc::new(flag),
        }
    }

    /// Cancels every clone of this signal.
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once cancelled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Completes when the signal fires.
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        let flagged = async move {
            // The sender lives as long as `self`, so `wait_for` only returns
            // once the flag flips.
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = flagged => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => flagged.await,
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}
