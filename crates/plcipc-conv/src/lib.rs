//! plcipc-conv - Variable type registry and wire marshalling
//!
//! Static type metadata and the encode/decode rules for process variables
//! exchanged with a PLC runtime over its IPC channel.
//!
//! # Wire rules
//!
//! - Multi-byte numerics travel in network byte order (big-endian).
//! - BOOL is one byte: `0xFF` for TRUE on writes, any non-zero byte reads
//!   as TRUE.
//! - REAL is a 4-byte IEEE-754 float, big-endian like the integers.
//! - STRING is NUL-terminated with a fixed 250-byte wire capacity,
//!   terminator included.
//! - Integer writes are range-checked against the kind's bounds before any
//!   bytes are produced.
//!
//! # Quick start
//!
//! ```rust
//! use plcipc_conv::{decode, encode, VarKind, VarValue};
//!
//! let desc = VarKind::Word.descriptor();
//!
//! let bytes = encode(desc, &VarValue::Int(0x1234)).unwrap();
//! assert_eq!(bytes, vec![0x12, 0x34]);
//!
//! let value = decode(desc, &bytes).unwrap();
//! assert_eq!(value, VarValue::Int(0x1234));
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod types;
pub mod value;

// Re-export main types
pub use decode::decode;
pub use encode::{check_value_kind, encode};
pub use error::{ConvError, ConvResult};
pub use types::{SemanticKind, TypeDescriptor, VarKind, STRING_CAPACITY};
pub use value::VarValue;
