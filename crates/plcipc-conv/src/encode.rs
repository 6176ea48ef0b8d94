//! Encoding values to wire bytes
//!
//! The wire uses network byte order for multi-byte values. Validation
//! happens here, before anything is handed to the transport.

use crate::error::{ConvError, ConvResult};
use crate::types::{TypeDescriptor, STRING_CAPACITY};
use crate::value::VarValue;

/// Encode a value according to its descriptor.
pub fn encode(desc: &TypeDescriptor, value: &VarValue) -> ConvResult<Vec<u8>> {
    if value.kind() != desc.semantic {
        return Err(ConvError::KindMismatch {
            expected: desc.semantic,
            actual: value.kind(),
        });
    }

    match value {
        // The wire convention for TRUE is all bits set, not 0x01.
        VarValue::Bool(b) => Ok(vec![if *b { 0xFF } else { 0x00 }]),
        VarValue::Int(v) => encode_int(desc, *v),
        VarValue::Real(v) => Ok(v.to_be_bytes().to_vec()),
        VarValue::Str(s) => encode_string(s),
    }
}

fn encode_int(desc: &TypeDescriptor, value: i64) -> ConvResult<Vec<u8>> {
    if let Some((min, max)) = desc.range {
        if value < min || value > max {
            return Err(ConvError::ValueOutOfRange { value, min, max });
        }
    }

    // Two's complement survives the truncation, so one path covers
    // signed and unsigned kinds alike.
    let full = (value as u64).to_be_bytes();
    Ok(full[8 - desc.byte_width..].to_vec())
}

fn encode_string(s: &str) -> ConvResult<Vec<u8>> {
    let len = s.len() + 1;
    if len > STRING_CAPACITY {
        return Err(ConvError::StringTooLong {
            len,
            max: STRING_CAPACITY,
        });
    }

    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    Ok(bytes)
}

/// Check that a value's variant matches the descriptor without encoding it.
pub fn check_value_kind(desc: &TypeDescriptor, value: &VarValue) -> ConvResult<()> {
    if value.kind() != desc.semantic {
        return Err(ConvError::KindMismatch {
            expected: desc.semantic,
            actual: value.kind(),
        });
    }
    Ok(())
}
