//! Module to signal phase changes in scenebench.
//!
//! Scenebench runs a renderer sub-process per scene and must be able to tell
//! every in-flight piece of work that the run is over, primarily on ctrl-c.
//! The mechanism has two halves: a [`Broadcaster`] that announces, exactly
//! once, that the phase has been reached, and any number of [`Watcher`]
//! instances that wait for the announcement. The signal is one-time; a second
//! phase needs a second pair.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::perf)]
#![deny(clippy::suspicious)]
#![deny(clippy::complexity)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]

use tokio::sync::broadcast::{self, error};

/// Construct a `Watcher` and `Broadcaster` pair.
#[must_use]
pub fn signal() -> (Watcher, Broadcaster) {
    // The broadcast channel is never written to. Its only job is the reliable
    // close notification every receiver observes when the sender drops.
    let (sender, receiver) = broadcast::channel(1);

    let w = Watcher {
        receiver,
        signal_received: false,
    };
    let b = Broadcaster { sender };

    (w, b)
}

#[derive(Debug)]
/// Announces to all [`Watcher`] instances that a phase has been reached.
pub struct Broadcaster {
    sender: broadcast::Sender<()>,
}

impl Broadcaster {
    /// Send the signal to all `Watcher` instances. Does not wait for anyone
    /// to observe it.
    pub fn signal(self) {
        drop(self.sender);
    }
}

#[derive(Debug)]
/// Waits for the phase announcement from the [`Broadcaster`].
pub struct Watcher {
    /// Transmission point for the signal from `Broadcaster`.
    receiver: broadcast::Receiver<()>,
    /// Set once the signal has been observed, so that `try_recv` stays cheap
    /// and idempotent afterward.
    signal_received: bool,
}

impl Watcher {
    /// Receive the signal. Blocks until it arrives; returns immediately if it
    /// already has.
    ///
    /// # Panics
    ///
    /// Panics if the broadcast receiver lags, which cannot happen on a
    /// channel that only ever closes.
    pub async fn recv(mut self) {
        if self.signal_received {
            // Once the signal is received, if this function were called in a
            // `select!` it might drown out every other arm.
            tokio::task::yield_now().await;
            return;
        }

        match self.receiver.recv().await {
            Ok(()) | Err(error::RecvError::Closed) => {
                self.signal_received = true;
            }
            Err(error::RecvError::Lagged(_)) => {
                panic!("catastrophic programming error: lagged behind");
            }
        }
    }

    /// Check whether the signal has been sent, without blocking. Idempotent:
    /// keeps returning `true` once the signal has been observed.
    ///
    /// # Panics
    ///
    /// Panics if the broadcast receiver lags, which cannot happen on a
    /// channel that only ever closes.
    pub fn try_recv(&mut self) -> bool {
        if self.signal_received {
            return true;
        }

        match self.receiver.try_recv() {
            Ok(()) | Err(error::TryRecvError::Closed) => {
                self.signal_received = true;
                true
            }
            Err(error::TryRecvError::Empty) => false,
            Err(error::TryRecvError::Lagged(_)) => {
                panic!("catastrophic programming error: lagged behind")
            }
        }
    }
}

impl Clone for Watcher {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.resubscribe(),
            signal_received: self.signal_received,
        }
    }
}
