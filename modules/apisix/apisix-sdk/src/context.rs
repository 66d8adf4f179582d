//! Per-call cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ApisixError;

/// Cancellation context carried by every resource operation.
///
/// Cloning is cheap and clones share the same cancellation state. Use
/// [`child`](Self::child) for a context that is cancelled with its parent
/// but can also be cancelled on its own.
///
/// ```ignore
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
/// let routes = cluster.route().list(&ctx).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline that is cancelled only explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token, such as one
    /// cancelled from a signal handler.
    #[must_use]
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Limit the context to `timeout` from now. An earlier deadline is kept.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Limit the context to `deadline`. An earlier deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    /// A context cancelled together with this one, with the same deadline.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline; zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context is already done.
    ///
    /// # Errors
    ///
    /// `Cancelled` if cancelled, `DeadlineExceeded` if the deadline passed.
    pub fn check(&self) -> Result<(), ApisixError> {
        if self.token.is_cancelled() {
            return Err(ApisixError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(ApisixError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it completes or the context is done.
    ///
    /// When the context finishes first, `fut` is dropped and the matching
    /// cancellation error is returned.
    ///
    /// # Errors
    ///
    /// `Cancelled`, `DeadlineExceeded`, or the error produced by `fut`.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ApisixError>
    where
        F: Future<Output = Result<T, ApisixError>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(ApisixError::Cancelled),
            () = deadline => Err(ApisixError::DeadlineExceeded),
            res = fut => res,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_completes_when_not_cancelled() {
        let ctx = CallContext::new();
        let res = ctx.run(async { Ok::<_, ApisixError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancelled_before_call_fails() {
        let ctx = CallContext::new();
        ctx.cancel();

        let res = ctx
            .run(async { Err::<(), _>(ApisixError::Transport("polled".to_owned())) })
            .await;
        assert!(matches!(res, Err(ApisixError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_during_call() {
        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let res: Result<(), _> = ctx.run(std::future::pending()).await;
        assert!(matches!(res, Err(ApisixError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_exceeded_during_call() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(1));
        let res: Result<(), _> = ctx.run(std::future::pending()).await;
        assert!(matches!(res, Err(ApisixError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_wins() {
        let ctx = CallContext::new()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(matches!(ctx.check(), Err(ApisixError::DeadlineExceeded)));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn external_token_cancels_in_flight_call() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(token.clone())
            .with_timeout(Duration::from_secs(60));
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let res: Result<(), _> = ctx.run(std::future::pending()).await;
        assert!(matches!(res, Err(ApisixError::Cancelled)));
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn child_follows_parent_but_not_vice_versa() {
        let parent = CallContext::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }
}
