//! Pending-operation retry loop
//!
//! The runtime answers some requests over multiple request/response cycles,
//! reporting `ClientPending` until the data arrives. The synchronous
//! wrappers busy-poll through those pending results against an absolute
//! deadline computed at entry. The deadline is checked before every attempt,
//! so a zero timeout performs no attempt at all.

use std::time::{Duration, Instant};

use crate::error::{IpcError, IpcResult};

/// Invoke `op` until it produces a value, fails hard, or the deadline
/// passes.
///
/// `op` returns `Ok(Some(v))` on success, `Ok(None)` to request another
/// attempt (used by type-class resolution while the wire code is still
/// unknown), or an error. Pending errors are retried immediately; any other
/// error propagates as-is. Deadline expiry maps to [`IpcError::Timeout`],
/// never to the raw pending error.
pub(crate) fn retry_while_pending<T>(
    timeout: Duration,
    mut op: impl FnMut() -> IpcResult<Option<T>>,
) -> IpcResult<T> {
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        match op() {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => continue,
            Err(e) if e.is_pending() => continue,
            Err(e) => return Err(e),
        }
    }

    Err(IpcError::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ResultCode;

    fn pending() -> IpcError {
        IpcError::Transport {
            code: ResultCode::ClientPending,
            message: ResultCode::ClientPending.to_string(),
        }
    }

    #[test]
    fn test_immediate_success() {
        let result = retry_while_pending(Duration::from_secs(1), || Ok(Some(42)));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_retries_through_pending() {
        let mut remaining = 5;
        let result = retry_while_pending(Duration::from_secs(5), || {
            if remaining > 0 {
                remaining -= 1;
                Err(pending())
            } else {
                Ok(Some("done"))
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_hard_error_propagates_without_retry() {
        let mut calls = 0;
        let result: IpcResult<()> = retry_while_pending(Duration::from_secs(5), || {
            calls += 1;
            Err(IpcError::Transport {
                code: ResultCode::ClientNotExist,
                message: ResultCode::ClientNotExist.to_string(),
            })
        });
        assert!(matches!(
            result,
            Err(IpcError::Transport {
                code: ResultCode::ClientNotExist,
                ..
            })
        ));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_always_pending_hits_timeout() {
        let result: IpcResult<()> =
            retry_while_pending(Duration::from_millis(20), || Err(pending()));
        assert_eq!(result.unwrap_err(), IpcError::Timeout);
    }

    #[test]
    fn test_zero_timeout_makes_no_attempt() {
        let mut calls = 0;
        let result: IpcResult<()> = retry_while_pending(Duration::ZERO, || {
            calls += 1;
            Ok(None)
        });
        assert_eq!(result.unwrap_err(), IpcError::Timeout);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_none_keeps_polling_until_deadline() {
        let result: IpcResult<()> =
            retry_while_pending(Duration::from_millis(10), || Ok(None));
        assert_eq!(result.unwrap_err(), IpcError::Timeout);
    }
}
