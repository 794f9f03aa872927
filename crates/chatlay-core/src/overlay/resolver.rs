//! Bounded discovery of native window handles.
//!
//! The host window and the embedded surface materialize asynchronously, so the
//! handle needed for styling may not exist yet when styling is requested. The
//! resolver polls with a fixed interval on the async runtime and reports
//! not-found as a plain value once the attempt budget is spent.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::overlay::platform::{WindowHandle, WindowStyler};

/// Predicate over visible top-level windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMatch {
    pub title: String,
    #[serde(default)]
    pub exact: bool,
    #[serde(default = "default_true")]
    pub own_process_only: bool,
}

fn default_true() -> bool {
    true
}

impl WindowMatch {
    pub fn title_contains(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            exact: false,
            own_process_only: true,
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        if self.exact {
            title == self.title
        } else {
            title.contains(&self.title)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_interval: Duration::from_millis(500),
        }
    }
}

/// Outcome of a cancellable resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(WindowHandle),
    NotFound,
    Cancelled,
}

/// Polls `find` up to `policy.max_attempts` times, sleeping `retry_interval`
/// after each miss.
pub async fn resolve<F>(mut find: F, policy: RetryPolicy) -> Option<WindowHandle>
where
    F: FnMut() -> Option<WindowHandle>,
{
    for attempt in 1..=policy.max_attempts {
        if let Some(handle) = find() {
            debug!(target: "chatlay::resolver", ?handle, attempt, "window resolved");
            return Some(handle);
        }
        trace!(target: "chatlay::resolver", attempt, "window not found yet");
        tokio::time::sleep(policy.retry_interval).await;
    }
    debug!(
        target: "chatlay::resolver",
        attempts = policy.max_attempts,
        "window not found, giving up"
    );
    None
}

/// [`resolve`] against a styler's window enumeration, detached from any borrow.
pub fn resolve_with(
    styler: Arc<dyn WindowStyler>,
    criteria: WindowMatch,
    policy: RetryPolicy,
) -> impl Future<Output = Option<WindowHandle>> + Send + 'static {
    async move { resolve(|| styler.find_window(&criteria), policy).await }
}

/// Cancels the paired future. Dropping the handle cancels as well.
#[derive(Debug)]
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

pub fn cancellable<F>(lookup: F) -> (impl Future<Output = Resolution> + Send + 'static, CancelHandle)
where
    F: Future<Output = Option<WindowHandle>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel::<()>();
    let fut = async move {
        tokio::select! {
            biased;
            _ = rx => Resolution::Cancelled,
            found = lookup => match found {
                Some(handle) => Resolution::Found(handle),
                None => Resolution::NotFound,
            },
        }
    };
    (fut, CancelHandle(tx))
}
