//! Politeness throttling between successive network calls.
//!
//! The inter-request wait is an explicit, cancellable operation — not
//! nondeterminism buried in a client — so tests can observe and fake it.

use std::time::Duration;

use tokio::{
  sync::{watch, Mutex},
  time::Instant,
};

/// Enforces a minimum delay between successive requests issued through one
/// source instance. The internal lock also serializes concurrent callers,
/// so a bounded fetch pool still spaces its requests out.
#[derive(Debug)]
pub struct Throttle {
  min_delay: Duration,
  last:      Mutex<Option<Instant>>,
}

impl Throttle {
  pub fn new(min_delay: Duration) -> Self {
    Self { min_delay, last: Mutex::new(None) }
  }

  /// Wait until the politeness delay since the previous request has
  /// elapsed. Returns `false` if `shutdown` fired first; the caller must
  /// abort its fetch.
  pub async fn wait(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
      return false;
    }

    let mut last = self.last.lock().await;
    if let Some(prev) = *last {
      let elapsed = prev.elapsed();
      if elapsed < self.min_delay {
        let remaining = self.min_delay - elapsed;
        let mut cancelled = false;
        let mut sender_gone = false;
        tokio::select! {
          _ = tokio::time::sleep(remaining) => {}
          stopped = shutdown.wait_for(|stop| *stop) => {
            if stopped.is_ok() {
              cancelled = true;
            } else {
              sender_gone = true;
            }
          }
        }
        if cancelled {
          return false;
        }
        if sender_gone {
          // The sender is gone; cancellation can no longer arrive.
          // Finish out the politeness delay.
          tokio::time::sleep(remaining).await;
        }
      }
    }

    *last = Some(Instant::now());
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn spaces_successive_requests_by_the_minimum_delay() {
    let throttle = Throttle::new(Duration::from_secs(2));
    let (_tx, mut rx) = watch::channel(false);

    let start = Instant::now();
    assert!(throttle.wait(&mut rx).await);
    assert!(start.elapsed() < Duration::from_millis(10));

    assert!(throttle.wait(&mut rx).await);
    assert!(start.elapsed() >= Duration::from_secs(2));
  }

  #[tokio::test(start_paused = true)]
  async fn shutdown_aborts_a_pending_wait() {
    let throttle = Throttle::new(Duration::from_secs(60));
    let (tx, mut rx) = watch::channel(false);

    assert!(throttle.wait(&mut rx).await);

    tx.send(true).unwrap();
    assert!(!throttle.wait(&mut rx).await);
  }
}
