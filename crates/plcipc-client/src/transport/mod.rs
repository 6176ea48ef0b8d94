//! Transport layer for the IPC channel
//!
//! The transport owns the physical request/response channel to the runtime:
//! it opens the sockets, frames requests, and runs its own background
//! processing. This core only consumes the synchronous primitives below;
//! each returns immediately with a result code, and a pending code means the
//! answer will arrive over later request/response cycles.
//!
//! # Example
//!
//! ```ignore
//! use plcipc_client::transport::{MockTransport, Transport};
//!
//! let transport = MockTransport::new();
//! transport.open("/run/plc/request", "/run/plc/response")?;
//! let running = transport.server_running()?;
//! ```

mod code;
pub mod mock;

pub use code::{CodeFamily, ResultCode};
pub use mock::MockTransport;

use std::time::Duration;

/// Result of a raw transport primitive. Any non-success code travels as the
/// error variant; `Ok` always corresponds to code `0x00`.
pub type TransportResult<T> = Result<T, ResultCode>;

/// Synchronous interface to the IPC request/response channel.
///
/// Implementations bind the real wire protocol (or a test double). All calls
/// return promptly; long-running operations report `ClientPending` and are
/// retried by the caller.
pub trait Transport: Send + Sync {
    /// Open the channel using the request and response socket paths.
    fn open(&self, request_path: &str, response_path: &str) -> TransportResult<()>;

    /// Start the channel's background request processing at the given poll
    /// interval.
    fn start_processing(&self, poll_interval: Duration) -> TransportResult<()>;

    /// Announce interest in a variable name to the runtime.
    fn subscribe(&self, name: &str) -> TransportResult<()>;

    /// Query the wire type code of a subscribed variable.
    fn var_type(&self, name: &str) -> TransportResult<u8>;

    /// Read the current raw value of a subscribed variable.
    ///
    /// `capacity` is the caller's buffer size; the returned bytes never
    /// exceed it.
    fn var_get(&self, name: &str, capacity: usize) -> TransportResult<Vec<u8>>;

    /// Write a raw value to a subscribed variable.
    fn var_set(&self, name: &str, data: &[u8]) -> TransportResult<()>;

    /// Query whether the runtime's program is currently executing.
    fn server_running(&self) -> TransportResult<bool>;

    /// Close the channel and stop background processing.
    fn close(&self) -> TransportResult<()>;

    /// Human-readable description of a result code.
    fn error_to_string(&self, code: ResultCode) -> String {
        code.to_string()
    }
}
