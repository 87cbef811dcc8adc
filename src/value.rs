//! Turns a raw wire value plus a declared type into a typed, displayable
//! value.

use crate::types::DeclaredType;
use crate::wire::{zigzag_decode32, zigzag_decode64};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedValue {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    String(std::string::String),
    Bytes(Vec<u8>),
    Enum { number: i32, name: Option<std::string::String> },
}

impl std::fmt::Display for RenderedValue {
    /// The literal rendered value, for field labels: enum values render as
    /// `name(number)`; every other type renders as its plain value — not
    /// the Rust-debug tagged form.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderedValue::Double(v) => write!(f, "{v}"),
            RenderedValue::Float(v) => write!(f, "{v}"),
            RenderedValue::Int32(v) => write!(f, "{v}"),
            RenderedValue::Int64(v) => write!(f, "{v}"),
            RenderedValue::Uint32(v) => write!(f, "{v}"),
            RenderedValue::Uint64(v) => write!(f, "{v}"),
            RenderedValue::Bool(v) => write!(f, "{v}"),
            RenderedValue::String(v) => write!(f, "{v}"),
            RenderedValue::Bytes(v) => write!(f, "{v:02x?}"),
            RenderedValue::Enum { number, name: Some(name) } => write!(f, "{name}({number})"),
            RenderedValue::Enum { number, name: None } => write!(f, "{number}"),
        }
    }
}

/// The raw bits a field decoder hands the renderer, tagged by the wire type
/// they were read as. `Varint` carries the byte-length of the varint on the
/// wire alongside its value — needed to reject multi-byte `bool` encodings,
/// since a bool must be exactly one byte on the wire to render at all.
#[derive(Debug, Clone, Copy)]
pub enum RawValue<'a> {
    Varint(u64, usize),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(&'a [u8]),
}

/// Renders `raw` as `declared`, or `None` if the combination has no defined
/// rendering (wire/declared type mismatch, or a multi-byte `bool`). A `None`
/// here does not halt decoding — the caller falls back to a raw-bytes leaf.
pub fn render(
    declared: DeclaredType,
    raw: &RawValue<'_>,
    resolve_enum_name: impl FnOnce(i32) -> Option<std::string::String>,
) -> Option<RenderedValue> {
    use DeclaredType::*;
    match (declared, raw) {
        (Double, RawValue::Fixed64(bits)) => Some(RenderedValue::Double(f64::from_bits(*bits))),
        (Float, RawValue::Fixed32(bits)) => Some(RenderedValue::Float(f32::from_bits(*bits))),
        (Int64, RawValue::Varint(v, _)) => Some(RenderedValue::Int64(*v as i64)),
        (Sfixed64, RawValue::Fixed64(v)) => Some(RenderedValue::Int64(*v as i64)),
        (Uint64, RawValue::Varint(v, _)) => Some(RenderedValue::Uint64(*v)),
        (Fixed64, RawValue::Fixed64(v)) => Some(RenderedValue::Uint64(*v)),
        (Int32, RawValue::Varint(v, _)) => Some(RenderedValue::Int32(*v as u32 as i32)),
        (Sfixed32, RawValue::Fixed32(v)) => Some(RenderedValue::Int32(*v as i32)),
        (Uint32, RawValue::Varint(v, _)) => Some(RenderedValue::Uint32(*v as u32)),
        (Fixed32, RawValue::Fixed32(v)) => Some(RenderedValue::Uint32(*v)),
        (Sint32, RawValue::Varint(v, _)) => Some(RenderedValue::Int32(zigzag_decode32(*v as u32))),
        (Sint64, RawValue::Varint(v, _)) => Some(RenderedValue::Int64(zigzag_decode64(*v))),
        (Bool, RawValue::Varint(v, len)) => {
            if *len > 1 {
                None
            } else {
                Some(RenderedValue::Bool(*v != 0))
            }
        }
        (Enum, RawValue::Varint(v, _)) => {
            let number = *v as u32 as i32;
            let name = resolve_enum_name(number);
            Some(RenderedValue::Enum { number, name })
        }
        (String, RawValue::Bytes(bytes)) => {
            Some(RenderedValue::String(std::string::String::from_utf8_lossy(bytes).into_owned()))
        }
        (Bytes, RawValue::Bytes(bytes)) => Some(RenderedValue::Bytes(bytes.to_vec())),
        _ => None,
    }
}

/// Companion rendering for the `dissect_bytes_as_string` preference: a lossy
/// UTF-8 view alongside the raw bytes, not instead of them.
pub fn render_bytes_as_string(bytes: &[u8]) -> RenderedValue {
    RenderedValue::String(std::string::String::from_utf8_lossy(bytes).into_owned())
}

/// One representative rendering for the schema-less fallback path: when no
/// declared type is available, render using the simplest type the observed
/// wire type and value support.
pub fn render_fallback(raw: &RawValue<'_>) -> Option<RenderedValue> {
    match raw {
        RawValue::Varint(v, _) => {
            if *v <= u32::MAX as u64 {
                Some(RenderedValue::Uint32(*v as u32))
            } else {
                Some(RenderedValue::Uint64(*v))
            }
        }
        RawValue::Fixed64(v) => Some(RenderedValue::Uint64(*v)),
        RawValue::Fixed32(v) => Some(RenderedValue::Uint32(*v)),
        RawValue::Bytes(bytes) => {
            Some(RenderedValue::String(std::string::String::from_utf8_lossy(bytes).into_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed64_as_double() {
        let bits = 3.5f64.to_bits();
        let rendered = render(DeclaredType::Double, &RawValue::Fixed64(bits), |_| None);
        assert_eq!(rendered, Some(RenderedValue::Double(3.5)));
    }

    #[test]
    fn renders_sint32_via_zigzag() {
        let rendered = render(DeclaredType::Sint32, &RawValue::Varint(1, 1), |_| None);
        assert_eq!(rendered, Some(RenderedValue::Int32(-1)));
    }

    #[test]
    fn bool_rejects_multi_byte_varint() {
        assert_eq!(render(DeclaredType::Bool, &RawValue::Varint(1, 2), |_| None), None);
        assert_eq!(
            render(DeclaredType::Bool, &RawValue::Varint(1, 1), |_| None),
            Some(RenderedValue::Bool(true))
        );
    }

    #[test]
    fn enum_carries_resolved_name_when_available() {
        let rendered = render(DeclaredType::Enum, &RawValue::Varint(2, 1), |n| {
            if n == 2 { Some("ACTIVE".into()) } else { None }
        });
        assert_eq!(
            rendered,
            Some(RenderedValue::Enum { number: 2, name: Some("ACTIVE".into()) })
        );
    }

    #[test]
    fn declared_wire_type_mismatch_yields_no_rendering() {
        // declared STRING, but the field arrived as a fixed32 (wire type 5)
        assert_eq!(render(DeclaredType::String, &RawValue::Fixed32(1), |_| None), None);
    }

    #[test]
    fn string_lossily_decodes_invalid_utf8() {
        let bytes = [0xff, 0xfe];
        let rendered = render(DeclaredType::String, &RawValue::Bytes(&bytes), |_| None);
        assert!(matches!(rendered, Some(RenderedValue::String(_))));
    }

    #[test]
    fn fallback_picks_uint32_or_uint64_by_magnitude() {
        assert_eq!(
            render_fallback(&RawValue::Varint(5, 1)),
            Some(RenderedValue::Uint32(5))
        );
        assert_eq!(
            render_fallback(&RawValue::Varint(u64::MAX, 10)),
            Some(RenderedValue::Uint64(u64::MAX))
        );
    }
}
