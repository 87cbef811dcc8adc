//! The closed declared-field-type enumeration and the table mapping each
//! wire type to the declared types it can legally carry.

use crate::wire::WireType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    /// No schema-declared type is available for this field.
    None,
}

impl DeclaredType {
    pub fn name(self) -> &'static str {
        use DeclaredType::*;
        match self {
            Double => "double",
            Float => "float",
            Int64 => "int64",
            Uint64 => "uint64",
            Int32 => "int32",
            Fixed64 => "fixed64",
            Fixed32 => "fixed32",
            Bool => "bool",
            String => "string",
            Group => "group",
            Message => "message",
            Bytes => "bytes",
            Uint32 => "uint32",
            Enum => "enum",
            Sfixed32 => "sfixed32",
            Sfixed64 => "sfixed64",
            Sint32 => "sint32",
            Sint64 => "sint64",
            None => "unknown",
        }
    }
}

/// Is `declared` a legal interpretation of a field encoded with `wire`?
///
/// The deprecated start-group/end-group wire framing itself is never
/// accepted: the tag splitter already refuses `StartGroup`/`EndGroup` wire
/// types outright (see [`crate::tag::Tag::is_malformed`]), so no rendering
/// path ever sees them here. A *declared* `Group` field, by contrast, is a
/// legal length-delimited interpretation alongside `Message` — it's the
/// legacy proto2 spelling for "nested message", and recurses the same way.
/// In practice `schema::declared_type` never actually produces `Group`:
/// `prost_reflect::Kind` has no variant distinguishing group-encoded fields
/// from ordinary messages, so a schema-resolved group field surfaces here as
/// `Message`. `Group` stays in this table so the combination isn't silently
/// rejected if a future descriptor source ever does distinguish it.
pub fn wire_type_compatible(wire: WireType, declared: DeclaredType) -> bool {
    use DeclaredType::*;
    match wire {
        WireType::Varint => {
            matches!(declared, Int32 | Int64 | Uint32 | Uint64 | Sint32 | Sint64 | Bool | Enum)
        }
        WireType::Fixed64 => matches!(declared, Fixed64 | Sfixed64 | Double),
        WireType::LengthDelimited => matches!(declared, String | Bytes | Message | Group),
        WireType::Fixed32 => matches!(declared, Fixed32 | Sfixed32 | Float),
        WireType::StartGroup | WireType::EndGroup => false,
    }
}

/// The declared types a schema-less field *could* plausibly carry given only
/// its observed wire type, used by the fallback renderer when it enumerates
/// every plausible interpretation instead of picking one. `Message` and
/// `Group` are intentionally excluded: both need a nested descriptor to
/// recurse into, and a schema-less field has none.
pub fn permitted_declared_types(wire: WireType) -> &'static [DeclaredType] {
    use DeclaredType::*;
    match wire {
        WireType::Varint => &[Int32, Int64, Uint32, Uint64, Sint32, Sint64, Bool, Enum],
        WireType::Fixed64 => &[Fixed64, Sfixed64, Double],
        WireType::Fixed32 => &[Fixed32, Sfixed32, Float],
        WireType::LengthDelimited => &[String, Bytes],
        WireType::StartGroup | WireType::EndGroup => &[],
    }
}
