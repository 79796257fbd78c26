//! Deadline and cancellation guard for stage I/O.

use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{HandshakeError, Result, Stage};

/// Run `future` unless the handshake is already cancelled or past its
/// deadline, aborting it as soon as either fires.
///
/// The future is not polled at all when cancellation has already been
/// observed, so no request leaves after that point.
pub async fn guarded<T>(
    cancel: &CancellationToken,
    deadline: Option<Instant>,
    stage: Stage,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(HandshakeError::cancelled(Some(stage)));
    }
    if deadline.is_some_and(|at| at <= Instant::now()) {
        return Err(HandshakeError::deadline_exceeded(Some(stage)));
    }

    let bounded = async {
        match deadline {
            Some(at) => match tokio::time::timeout_at(at, future).await {
                Ok(result) => result,
                Err(_) => Err(HandshakeError::deadline_exceeded(Some(stage))),
            },
            None => future.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(HandshakeError::cancelled(Some(stage))),
        result = bounded => result,
    }
}
