//! Variable kinds and the static type descriptor registry
//!
//! Every variable type the runtime exposes is described by one immutable
//! [`TypeDescriptor`]. The wire codes are fixed by the IPC protocol and must
//! not change.

use serde::{Deserialize, Serialize};

/// Maximum wire size of a string value in bytes, terminator included.
pub const STRING_CAPACITY: usize = 250;

/// The IEC variable kinds supported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Bool,
    Byte,
    Word,
    DWord,
    USInt,
    UInt,
    UDInt,
    SInt,
    Int,
    DInt,
    Real,
    #[serde(rename = "string")]
    Str,
}

/// Local representation class of a variable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticKind {
    Bool,
    Integer,
    Float,
    String,
}

/// Static metadata for one supported variable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub kind: VarKind,
    /// Type code reported by the transport's `var_type` query
    pub wire_code: u8,
    pub semantic: SemanticKind,
    /// Exact wire size; for strings this is the buffer capacity
    pub byte_width: usize,
    pub signed: bool,
    /// Inclusive value bounds, integer kinds only
    pub range: Option<(i64, i64)>,
}

/// One descriptor per kind, indexed by `VarKind` discriminant.
static DESCRIPTORS: [TypeDescriptor; 12] = [
    TypeDescriptor {
        kind: VarKind::Bool,
        wire_code: 1,
        semantic: SemanticKind::Bool,
        byte_width: 1,
        signed: false,
        range: None,
    },
    TypeDescriptor {
        kind: VarKind::Byte,
        wire_code: 2,
        semantic: SemanticKind::Integer,
        byte_width: 1,
        signed: false,
        range: Some((0, 255)),
    },
    TypeDescriptor {
        kind: VarKind::Word,
        wire_code: 3,
        semantic: SemanticKind::Integer,
        byte_width: 2,
        signed: false,
        range: Some((0, 65_535)),
    },
    TypeDescriptor {
        kind: VarKind::DWord,
        wire_code: 4,
        semantic: SemanticKind::Integer,
        byte_width: 4,
        signed: false,
        range: Some((0, 4_294_967_295)),
    },
    TypeDescriptor {
        kind: VarKind::USInt,
        wire_code: 5,
        semantic: SemanticKind::Integer,
        byte_width: 1,
        signed: false,
        range: Some((0, 255)),
    },
    TypeDescriptor {
        kind: VarKind::UInt,
        wire_code: 6,
        semantic: SemanticKind::Integer,
        byte_width: 2,
        signed: false,
        range: Some((0, 65_535)),
    },
    TypeDescriptor {
        kind: VarKind::UDInt,
        wire_code: 7,
        semantic: SemanticKind::Integer,
        byte_width: 4,
        signed: false,
        range: Some((0, 4_294_967_295)),
    },
    TypeDescriptor {
        kind: VarKind::SInt,
        wire_code: 8,
        semantic: SemanticKind::Integer,
        byte_width: 1,
        signed: true,
        range: Some((-128, 127)),
    },
    TypeDescriptor {
        kind: VarKind::Int,
        wire_code: 9,
        semantic: SemanticKind::Integer,
        byte_width: 2,
        signed: true,
        range: Some((-32_768, 32_767)),
    },
    TypeDescriptor {
        kind: VarKind::DInt,
        wire_code: 10,
        semantic: SemanticKind::Integer,
        byte_width: 4,
        signed: true,
        range: Some((-2_147_483_648, 2_147_483_647)),
    },
    TypeDescriptor {
        kind: VarKind::Real,
        wire_code: 11,
        semantic: SemanticKind::Float,
        byte_width: 4,
        signed: true,
        range: None,
    },
    TypeDescriptor {
        kind: VarKind::Str,
        wire_code: 20,
        semantic: SemanticKind::String,
        byte_width: STRING_CAPACITY,
        signed: false,
        range: None,
    },
];

impl VarKind {
    /// Get the static descriptor for this kind.
    pub fn descriptor(self) -> &'static TypeDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Wire type code of this kind.
    pub fn wire_code(self) -> u8 {
        self.descriptor().wire_code
    }

    /// Look up the kind for a wire type code reported by the transport.
    pub fn from_wire_code(code: u8) -> Option<VarKind> {
        DESCRIPTORS
            .iter()
            .find(|d| d.wire_code == code)
            .map(|d| d.kind)
    }

    /// All supported kinds, in wire code order.
    pub fn all() -> impl Iterator<Item = VarKind> {
        DESCRIPTORS.iter().map(|d| d.kind)
    }
}

impl std::fmt::Display for VarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VarKind::Bool => "bool",
            VarKind::Byte => "byte",
            VarKind::Word => "word",
            VarKind::DWord => "dword",
            VarKind::USInt => "usint",
            VarKind::UInt => "uint",
            VarKind::UDInt => "udint",
            VarKind::SInt => "sint",
            VarKind::Int => "int",
            VarKind::DInt => "dint",
            VarKind::Real => "real",
            VarKind::Str => "string",
        };
        f.write_str(s)
    }
}

impl std::fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SemanticKind::Bool => "bool",
            SemanticKind::Integer => "integer",
            SemanticKind::Float => "float",
            SemanticKind::String => "string",
        };
        f.write_str(s)
    }
}
