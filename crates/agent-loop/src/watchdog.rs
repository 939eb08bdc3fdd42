//! Re-armable inactivity deadline for streamed turns.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Turn phases at which the watchdog is re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingRouter,
    ToolExecution,
    Generating,
}

/// A cancellable deadline. Re-arming replaces the previous deadline; clearing
/// disarms it so [`Watchdog::expired`] never resolves.
#[derive(Debug)]
pub struct Watchdog {
    deadline: watch::Sender<Option<Instant>>,
}

impl Watchdog {
    pub fn new() -> Self {
        let (deadline, _) = watch::channel(None);
        Self { deadline }
    }

    pub fn arm(&self, window: Duration) {
        self.deadline.send_replace(Some(Instant::now() + window));
    }

    pub fn clear(&self) {
        self.deadline.send_replace(None);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.borrow().is_some()
    }

    /// Resolves once the current deadline passes without being re-armed or cleared.
    pub async fn expired(&self) {
        let mut rx = self.deadline.subscribe();

        loop {
            let deadline = *rx.borrow_and_update();
            match deadline {
                Some(at) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(at) => return,
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return std::future::pending().await;
                            }
                        }
                    }
                }
                None => {
                    if rx.changed().await.is_err() {
                        return std::future::pending().await;
                    }
                }
            }
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}
