//! Unrolls a packed-repeated field's length-delimited payload into its
//! fixed-stride or varint elements.

use crate::types::DeclaredType;
use crate::value::{render, RawValue, RenderedValue};
use crate::wire::ByteRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedExpandError {
    /// `declared` cannot be packed at all (e.g. STRING, MESSAGE).
    UnsupportedType,
    /// The payload didn't cleanly divide into elements (a truncated varint,
    /// or a length not a multiple of the fixed stride).
    Truncated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackedElement {
    pub offset: usize,
    pub len: usize,
    pub value: RenderedValue,
}

/// Expands `payload` (the field's length-delimited value range) into its
/// packed elements, or fails without partially mutating caller state — a
/// failure here only halts this field's expansion, never the enclosing
/// message. `resolve_enum_name` is consulted for every element when
/// `declared` is `Enum`, exactly as a non-packed enum field would be, so a
/// packed-repeated enum element gets its name resolved the same way a
/// scalar one does.
pub fn expand(
    payload: ByteRange<'_>,
    declared: DeclaredType,
    resolve_enum_name: impl Fn(i32) -> Option<std::string::String>,
) -> Result<Vec<PackedElement>, PackedExpandError> {
    use DeclaredType::*;
    match declared {
        Int32 | Int64 | Uint32 | Uint64 | Sint32 | Sint64 | Bool | Enum => {
            expand_varint(payload, declared, resolve_enum_name)
        }
        Fixed64 | Sfixed64 | Double => expand_fixed(payload, declared, 8),
        Fixed32 | Sfixed32 | Float => expand_fixed(payload, declared, 4),
        _ => Err(PackedExpandError::UnsupportedType),
    }
}

fn expand_varint(
    payload: ByteRange<'_>,
    declared: DeclaredType,
    resolve_enum_name: impl Fn(i32) -> Option<std::string::String>,
) -> Result<Vec<PackedElement>, PackedExpandError> {
    let mut elements = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let (value, consumed) = payload
            .read_varint(offset)
            .map_err(|_| PackedExpandError::Truncated)?;
        let raw = RawValue::Varint(value, consumed);
        let rendered = render(declared, &raw, |n| resolve_enum_name(n)).ok_or(PackedExpandError::Truncated)?;
        elements.push(PackedElement { offset, len: consumed, value: rendered });
        offset += consumed;
    }
    Ok(elements)
}

fn expand_fixed(
    payload: ByteRange<'_>,
    declared: DeclaredType,
    stride: usize,
) -> Result<Vec<PackedElement>, PackedExpandError> {
    if payload.len() % stride != 0 {
        return Err(PackedExpandError::Truncated);
    }
    let mut elements = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let raw = if stride == 8 {
            RawValue::Fixed64(payload.read_fixed64(offset).map_err(|_| PackedExpandError::Truncated)?)
        } else {
            RawValue::Fixed32(payload.read_fixed32(offset).map_err(|_| PackedExpandError::Truncated)?)
        };
        let rendered = render(declared, &raw, |_| None).ok_or(PackedExpandError::Truncated)?;
        elements.push(PackedElement { offset, len: stride, value: rendered });
        offset += stride;
    }
    Ok(elements)
}
