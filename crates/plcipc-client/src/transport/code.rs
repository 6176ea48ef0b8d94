//! IPC result codes
//!
//! The wire protocol reports every operation's outcome as a one-byte result
//! code. The numeric values are fixed by the protocol and reproduced here
//! exactly.

use std::fmt;

/// Result code of a raw IPC operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,

    InvalidArgument,

    // Connection layer
    SocketCreate,
    SocketBind,
    SocketConnect,
    SocketSend,
    SocketRecv,

    // Framing layer
    FrameInvalid,
    FrameBufferTooSmall,

    // Client layer
    ClientPending,
    ClientTimeout,
    ClientProtocol,
    ClientBufferTooSmall,
    ClientSubscribe,
    ClientNotSubscribed,
    ClientNotExist,
    ClientInvalidType,
    ClientThreadStart,

    // Server layer
    ServerProtocol,
    ServerBufferTooSmall,

    /// Unknown/reserved code
    Unknown(u8),
}

/// Coarse grouping of result codes by protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFamily {
    Success,
    InvalidArgument,
    Connection,
    Framing,
    Client,
    Server,
    Unknown,
}

impl ResultCode {
    /// The layer this code belongs to.
    pub fn family(self) -> CodeFamily {
        match u8::from(self) {
            0x00 => CodeFamily::Success,
            0x01 => CodeFamily::InvalidArgument,
            0x11..=0x15 => CodeFamily::Connection,
            0x21..=0x22 => CodeFamily::Framing,
            0x31..=0x39 => CodeFamily::Client,
            0x41..=0x42 => CodeFamily::Server,
            _ => CodeFamily::Unknown,
        }
    }

    /// Whether this code is the soft, retryable "answer not yet available"
    /// condition.
    pub fn is_pending(self) -> bool {
        self == ResultCode::ClientPending
    }
}

impl From<u8> for ResultCode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Success,
            0x01 => Self::InvalidArgument,
            0x11 => Self::SocketCreate,
            0x12 => Self::SocketBind,
            0x13 => Self::SocketConnect,
            0x14 => Self::SocketSend,
            0x15 => Self::SocketRecv,
            0x21 => Self::FrameInvalid,
            0x22 => Self::FrameBufferTooSmall,
            0x31 => Self::ClientPending,
            0x32 => Self::ClientTimeout,
            0x33 => Self::ClientProtocol,
            0x34 => Self::ClientBufferTooSmall,
            0x35 => Self::ClientSubscribe,
            0x36 => Self::ClientNotSubscribed,
            0x37 => Self::ClientNotExist,
            0x38 => Self::ClientInvalidType,
            0x39 => Self::ClientThreadStart,
            0x41 => Self::ServerProtocol,
            0x42 => Self::ServerBufferTooSmall,
            other => Self::Unknown(other),
        }
    }
}

impl From<ResultCode> for u8 {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::Success => 0x00,
            ResultCode::InvalidArgument => 0x01,
            ResultCode::SocketCreate => 0x11,
            ResultCode::SocketBind => 0x12,
            ResultCode::SocketConnect => 0x13,
            ResultCode::SocketSend => 0x14,
            ResultCode::SocketRecv => 0x15,
            ResultCode::FrameInvalid => 0x21,
            ResultCode::FrameBufferTooSmall => 0x22,
            ResultCode::ClientPending => 0x31,
            ResultCode::ClientTimeout => 0x32,
            ResultCode::ClientProtocol => 0x33,
            ResultCode::ClientBufferTooSmall => 0x34,
            ResultCode::ClientSubscribe => 0x35,
            ResultCode::ClientNotSubscribed => 0x36,
            ResultCode::ClientNotExist => 0x37,
            ResultCode::ClientInvalidType => 0x38,
            ResultCode::ClientThreadStart => 0x39,
            ResultCode::ServerProtocol => 0x41,
            ResultCode::ServerBufferTooSmall => 0x42,
            ResultCode::Unknown(v) => v,
        }
    }
}

impl fmt::UpperHex for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: u8 = (*self).into();
        fmt::UpperHex::fmt(&value, f)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::InvalidArgument => "invalid argument",
            Self::SocketCreate => "socket creation failed",
            Self::SocketBind => "socket bind failed",
            Self::SocketConnect => "socket connect failed",
            Self::SocketSend => "socket send failed",
            Self::SocketRecv => "socket receive failed",
            Self::FrameInvalid => "invalid frame",
            Self::FrameBufferTooSmall => "frame buffer too small",
            Self::ClientPending => "operation still pending",
            Self::ClientTimeout => "request timed out",
            Self::ClientProtocol => "client protocol violation",
            Self::ClientBufferTooSmall => "client buffer too small",
            Self::ClientSubscribe => "subscribe failed",
            Self::ClientNotSubscribed => "variable not subscribed",
            Self::ClientNotExist => "variable does not exist",
            Self::ClientInvalidType => "invalid variable type",
            Self::ClientThreadStart => "processing thread start failed",
            Self::ServerProtocol => "server protocol violation",
            Self::ServerBufferTooSmall => "server buffer too small",
            Self::Unknown(v) => return write!(f, "unknown result code 0x{:02X}", v),
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for raw in 0x00..=0xFF {
            let code = ResultCode::from(raw);
            assert_eq!(u8::from(code), raw);
        }
    }

    #[test]
    fn test_exact_values() {
        assert_eq!(u8::from(ResultCode::Success), 0x00);
        assert_eq!(u8::from(ResultCode::InvalidArgument), 0x01);
        assert_eq!(u8::from(ResultCode::SocketCreate), 0x11);
        assert_eq!(u8::from(ResultCode::SocketRecv), 0x15);
        assert_eq!(u8::from(ResultCode::FrameInvalid), 0x21);
        assert_eq!(u8::from(ResultCode::ClientPending), 0x31);
        assert_eq!(u8::from(ResultCode::ClientTimeout), 0x32);
        assert_eq!(u8::from(ResultCode::ClientThreadStart), 0x39);
        assert_eq!(u8::from(ResultCode::ServerBufferTooSmall), 0x42);
    }

    #[test]
    fn test_families() {
        assert_eq!(ResultCode::Success.family(), CodeFamily::Success);
        assert_eq!(ResultCode::SocketBind.family(), CodeFamily::Connection);
        assert_eq!(ResultCode::FrameInvalid.family(), CodeFamily::Framing);
        assert_eq!(ResultCode::ClientPending.family(), CodeFamily::Client);
        assert_eq!(ResultCode::ServerProtocol.family(), CodeFamily::Server);
        assert_eq!(ResultCode::Unknown(0xEE).family(), CodeFamily::Unknown);
    }

    #[test]
    fn test_pending_is_the_only_soft_code() {
        assert!(ResultCode::ClientPending.is_pending());
        assert!(!ResultCode::ClientTimeout.is_pending());
        assert!(!ResultCode::ClientNotExist.is_pending());
    }
}
