//! Run context - build once, pass everywhere
//!
//! Every public operation takes a `&RunContext` and calls [`RunContext::check`]
//! before blocking work. Cancellation is cooperative: firing the signal only
//! takes effect at the next check.
//!
//! ```text
//! main.rs:
//!   RunContext::new() -> &RunContext
//!   |
//!   v
//! resolver / reader / emitter / catalog pages:
//!   ctx.check()?
//! ```

use crate::core::error::{PipelineError, PipelineResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cancellation signal plus optional deadline shared by one invocation.
///
/// Clones share the same signal, so a clone handed to a signal handler (or a
/// test) can cancel work running on another clone.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
  cancelled: Arc<AtomicBool>,
  deadline: Option<Instant>,
}

impl RunContext {
  /// A context that is never cancelled unless [`cancel`](Self::cancel) is called
  pub fn new() -> Self {
    Self::default()
  }

  /// Derive a context that additionally expires after `timeout`.
  ///
  /// The derived context shares the cancellation signal; the earlier of the
  /// two deadlines wins.
  pub fn with_timeout(&self, timeout: Duration) -> Self {
    let deadline = Instant::now() + timeout;
    Self {
      cancelled: Arc::clone(&self.cancelled),
      deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
    }
  }

  /// Fire the cancellation signal
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  /// Whether the signal fired or the deadline passed
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
  }

  /// Return `Cancelled` if the signal fired or the deadline passed
  pub fn check(&self) -> PipelineResult<()> {
    if self.is_cancelled() {
      Err(PipelineError::Cancelled)
    } else {
      Ok(())
    }
  }
}
