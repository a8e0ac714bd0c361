//! Per-call cancellation and deadline handling.
//!
//! Every remote operation takes a [`CallContext`]. The context is raced
//! against the in-flight request, so cancelling it (or letting its deadline
//! pass) drops the request future and returns a cancellation-class error.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context cancelled together with `token`.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Add a deadline `timeout` from now. An earlier existing deadline wins.
    /// A timeout too large to represent adds no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Derive a context that is cancelled when this one is, but whose own
    /// cancellation does not propagate back up.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if matches!(self.deadline, Some(d) if d <= Instant::now()) {
            return Err(Error::DeadlineExceeded);
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("call cancelled by context");
                Err(Error::Cancelled)
            }
            _ = expiry => {
                debug!("call deadline exceeded");
                Err(Error::DeadlineExceeded)
            }
            result = fut => result,
        }
    }
}
