//! Cancellable execution context threaded through store operations.
//!
//! Clones share one cancellation flag, so cancelling any handle cancels every
//! operation holding a clone. Deadlines are checked against the monotonic
//! clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::DomainError;

/// Why an operation context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// The context may still be used.
    Active,
    /// [`OperationContext::cancel`] was called on this context or a clone.
    Cancelled,
    /// The deadline has passed.
    DeadlineExceeded,
}

/// Execution context accepted by every store operation.
///
/// # Examples
/// ```
/// use accounts::domain::{ContextState, OperationContext};
///
/// let ctx = OperationContext::background();
/// assert_eq!(ctx.state(), ContextState::Active);
/// ctx.cancel();
/// assert_eq!(ctx.state(), ContextState::Cancelled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context that never expires unless cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context sharing this one's cancellation flag with an absolute deadline.
    ///
    /// The earlier of the existing and the new deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Derive a context that expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Cancel this context and every clone derived from it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Current state of the context.
    pub fn state(&self) -> ContextState {
        if self.cancelled.load(Ordering::SeqCst) {
            return ContextState::Cancelled;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => ContextState::DeadlineExceeded,
            _ => ContextState::Active,
        }
    }

    /// Fail with [`super::ErrorCode::Cancelled`] unless the context is still active.
    pub fn ensure_active(&self, operation: &str) -> Result<(), DomainError> {
        match self.state() {
            ContextState::Active => Ok(()),
            ContextState::Cancelled => Err(DomainError::cancelled(format!(
                "{operation}: context cancelled"
            ))),
            ContextState::DeadlineExceeded => Err(DomainError::cancelled(format!(
                "{operation}: context deadline exceeded"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn background_context_is_active() {
        let ctx = OperationContext::background();
        assert_eq!(ctx.state(), ContextState::Active);
        assert!(ctx.ensure_active("get contact").is_ok());
    }

    #[rstest]
    fn cancelling_a_clone_cancels_the_parent() {
        let parent = OperationContext::background();
        let child = parent.with_timeout(Duration::from_secs(60));
        child.cancel();

        let err = parent
            .ensure_active("create contact")
            .expect_err("parent shares the cancellation flag");
        assert_eq!(err.code(), ErrorCode::Cancelled);
        assert_eq!(err.message(), "create contact: context cancelled");
    }

    #[rstest]
    fn elapsed_deadline_reports_expiry() {
        let ctx = OperationContext::background().with_deadline(Instant::now());
        assert_eq!(ctx.state(), ContextState::DeadlineExceeded);
        let err = ctx.ensure_active("update contact").expect_err("deadline passed");
        assert_eq!(err.code(), ErrorCode::Cancelled);
        assert!(err.message().contains("deadline exceeded"));
    }

    #[rstest]
    fn earlier_deadline_is_kept() {
        let now = Instant::now();
        let soon = now + Duration::from_secs(1);
        let later = now + Duration::from_secs(120);
        let ctx = OperationContext::background()
            .with_deadline(soon)
            .with_deadline(later);
        assert_eq!(ctx.deadline(), Some(soon));
    }
}
