//! Decoding wire bytes to values
//!
//! Mirrors `encode`: network byte order in, host values out.

use crate::error::{ConvError, ConvResult};
use crate::types::{SemanticKind, TypeDescriptor};
use crate::value::VarValue;

/// Decode raw bytes according to a descriptor.
pub fn decode(desc: &TypeDescriptor, data: &[u8]) -> ConvResult<VarValue> {
    match desc.semantic {
        SemanticKind::Bool => {
            expect_len(desc, data)?;
            // Any non-zero byte counts as TRUE.
            Ok(VarValue::Bool(data[0] != 0))
        }
        SemanticKind::Integer => {
            expect_len(desc, data)?;
            Ok(VarValue::Int(read_int(desc, data)))
        }
        SemanticKind::Float => {
            expect_len(desc, data)?;
            let raw: [u8; 4] = data.try_into().map_err(|_| ConvError::LengthMismatch {
                expected: 4,
                actual: data.len(),
            })?;
            Ok(VarValue::Real(f32::from_be_bytes(raw)))
        }
        SemanticKind::String => decode_string(data),
    }
}

fn expect_len(desc: &TypeDescriptor, data: &[u8]) -> ConvResult<()> {
    if data.len() != desc.byte_width {
        return Err(ConvError::LengthMismatch {
            expected: desc.byte_width,
            actual: data.len(),
        });
    }
    Ok(())
}

fn read_int(desc: &TypeDescriptor, data: &[u8]) -> i64 {
    let mut acc: u64 = 0;
    for &b in data {
        acc = (acc << 8) | u64::from(b);
    }

    if desc.signed {
        let shift = 64 - 8 * desc.byte_width as u32;
        ((acc << shift) as i64) >> shift
    } else {
        acc as i64
    }
}

fn decode_string(data: &[u8]) -> ConvResult<VarValue> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let s = String::from_utf8(data[..end].to_vec())
        .map_err(|e| ConvError::InvalidUtf8(e.to_string()))?;
    Ok(VarValue::Str(s))
}
