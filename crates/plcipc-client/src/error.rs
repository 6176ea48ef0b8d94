//! Client error types
//!
//! Errors carry a kind plus a human-readable message. Local validation
//! failures (type/range/size) stay distinct from transport faults even when
//! both can surface from the same call. `PartialEq` is derived so
//! subscription processing can suppress repeated delivery of an unchanged
//! error.

use thiserror::Error;

use plcipc_conv::{ConvError, VarKind};

use crate::transport::ResultCode;

/// Errors surfaced by the IPC client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IpcError {
    /// A raw IPC operation returned a non-success result code
    #[error("transport error 0x{code:02X}: {message}")]
    Transport { code: ResultCode, message: String },

    /// The runtime reports a different type than the variable was bound with
    #[error(
        "variable '{name}' type mismatch: bound as {expected}, runtime reports wire code {actual_code}"
    )]
    TypeMismatch {
        name: String,
        expected: VarKind,
        actual_code: u8,
    },

    /// Local validation failure (kind, range, or size)
    #[error(transparent)]
    Value(#[from] ConvError),

    /// The variable has not been registered with a client yet
    #[error("variable '{name}' is not registered with a client")]
    NotRegistered { name: String },

    /// The variable is already bound to a different open client
    #[error("variable '{name}' is already registered with another client")]
    AlreadyRegistered { name: String },

    /// The client has been closed
    #[error("client is closed")]
    ClientClosed,

    /// A synchronous wrapper ran out of time while the operation was still
    /// pending
    #[error("synchronous request timed out")]
    Timeout,

    /// Shared client requested with different connection settings than the
    /// open instance
    #[error("shared client already open with different connection settings")]
    SharedConfigMismatch,

    /// Shared client released more often than acquired
    #[error("shared client released more times than acquired")]
    SharedNotOpen,
}

impl IpcError {
    /// Whether this error is the soft, retryable pending condition.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            IpcError::Transport {
                code: ResultCode::ClientPending,
                ..
            }
        )
    }

    /// The transport result code, if this error came off the wire.
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            IpcError::Transport { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type IpcResult<T> = Result<T, IpcError>;
