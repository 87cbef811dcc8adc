//! Reads one field — tag, then value — dispatching on wire type and, when
//! a schema is available, on declared type.

use prost_reflect::MessageDescriptor;

use crate::config::Config;
use crate::error::ExpertInfoKind;
use crate::message::decode_message;
use crate::packed::{self, PackedExpandError};
use crate::schema;
use crate::tag::split_tag;
use crate::tree::{ByteSpan, Node};
use crate::types::{self, DeclaredType};
use crate::value::{render, render_fallback, RawValue, RenderedValue};
use crate::wire::{ByteRange, WireType};

pub enum FieldOutcome {
    Decoded { node: Node, consumed: usize },
    /// Halts the enclosing message. `partial` is appended first when
    /// there's enough information to show something (e.g. the field
    /// number was read before the failure).
    Failed { partial: Option<Node>, kind: ExpertInfoKind },
}

/// Decodes one field starting at `range`'s local offset `at`. `base_offset`
/// is `at`'s position in the original top-level buffer, used only to report
/// absolute byte spans on the emitted node.
pub fn decode_field(
    range: ByteRange<'_>,
    at: usize,
    base_offset: usize,
    descriptor: Option<&MessageDescriptor>,
    config: &Config,
) -> FieldOutcome {
    let (tag_value, tag_len) = match range.read_varint(at) {
        Ok(v) => v,
        Err(_) => return FieldOutcome::Failed { partial: None, kind: ExpertInfoKind::FailedParseTag },
    };
    let tag = split_tag(tag_value);
    let field_start = base_offset + at;

    let Some(wire_type) = tag.wire_type().filter(|_| !tag.is_malformed()) else {
        let partial = Node::interior(
            format!("{}: <invalid wire type>", tag.field_number),
            ByteSpan::new(field_start, tag_len),
        );
        return FieldOutcome::Failed { partial: Some(partial), kind: ExpertInfoKind::WireTypeInvalid };
    };

    let field = descriptor.and_then(|d| d.get_field(tag.field_number));
    let field_name = field.as_ref().map(|f| f.name().to_string());
    let declared = field.as_ref().map(|f| schema::declared_type(f)).unwrap_or(DeclaredType::None);
    let enclosing = descriptor.cloned();

    match wire_type {
        WireType::Varint => {
            let value_at = at + tag_len;
            let (value, value_len) = match range.read_varint(value_at) {
                Ok(v) => v,
                Err(_) => {
                    return field_failed(tag.field_number, field_start, tag_len, ExpertInfoKind::FailedParseField)
                }
            };
            let raw = RawValue::Varint(value, value_len);
            let node = render_scalar_field(
                &tag,
                field_name,
                declared,
                &raw,
                field.as_ref(),
                enclosing.clone(),
                field_start,
                tag_len + value_len,
                config,
            );
            FieldOutcome::Decoded { node, consumed: tag_len + value_len }
        }
        WireType::Fixed64 => {
            let value_at = at + tag_len;
            let value = match range.read_fixed64(value_at) {
                Ok(v) => v,
                Err(_) => {
                    return field_failed(tag.field_number, field_start, tag_len, ExpertInfoKind::FailedParseField)
                }
            };
            let raw = RawValue::Fixed64(value);
            let node = render_scalar_field(
                &tag,
                field_name,
                declared,
                &raw,
                field.as_ref(),
                enclosing.clone(),
                field_start,
                tag_len + 8,
                config,
            );
            FieldOutcome::Decoded { node, consumed: tag_len + 8 }
        }
        WireType::Fixed32 => {
            let value_at = at + tag_len;
            let value = match range.read_fixed32(value_at) {
                Ok(v) => v,
                Err(_) => {
                    return field_failed(tag.field_number, field_start, tag_len, ExpertInfoKind::FailedParseField)
                }
            };
            let raw = RawValue::Fixed32(value);
            let node = render_scalar_field(
                &tag,
                field_name,
                declared,
                &raw,
                field.as_ref(),
                enclosing.clone(),
                field_start,
                tag_len + 4,
                config,
            );
            FieldOutcome::Decoded { node, consumed: tag_len + 4 }
        }
        WireType::LengthDelimited => {
            let len_at = at + tag_len;
            let (payload_len, len_len) = match range.read_varint(len_at) {
                Ok(v) => v,
                Err(_) => {
                    return field_failed(
                        tag.field_number,
                        field_start,
                        tag_len,
                        ExpertInfoKind::FailedParseLengthDelimitedField,
                    )
                }
            };
            let payload_at = len_at + len_len;
            let payload = match range.read_slice(payload_at, payload_len as usize) {
                Ok(p) => p,
                Err(_) => {
                    return field_failed(
                        tag.field_number,
                        field_start,
                        tag_len,
                        ExpertInfoKind::FailedParseLengthDelimitedField,
                    )
                }
            };
            let consumed = tag_len + len_len + payload_len as usize;
            let node = decode_length_delimited_field(
                &tag,
                field_name,
                declared,
                field.as_ref(),
                enclosing,
                payload,
                base_offset + payload_at,
                field_start,
                consumed,
                config,
            );
            FieldOutcome::Decoded { node, consumed }
        }
        WireType::StartGroup | WireType::EndGroup => unreachable!("rejected by tag.is_malformed()"),
    }
}

fn field_failed(field_number: u32, field_start: usize, tag_len: usize, kind: ExpertInfoKind) -> FieldOutcome {
    let partial = Node::interior(format!("{field_number}: <truncated>"), ByteSpan::new(field_start, tag_len));
    FieldOutcome::Failed { partial: Some(partial), kind }
}

#[allow(clippy::too_many_arguments)]
fn render_scalar_field(
    tag: &crate::tag::Tag,
    field_name: Option<std::string::String>,
    declared: DeclaredType,
    raw: &RawValue<'_>,
    field: Option<&prost_reflect::FieldDescriptor>,
    enclosing: Option<MessageDescriptor>,
    field_start: usize,
    total_len: usize,
    config: &Config,
) -> Node {
    let span = ByteSpan::new(field_start, total_len);
    let compatible = wire_type_of(raw).map(|w| types::wire_type_compatible(w, declared)).unwrap_or(false);

    let rendered = if declared != DeclaredType::None && compatible {
        let field = field.expect("declared type implies a resolved field");
        render(declared, raw, |n| schema::enum_value_name(field, n))
    } else if declared == DeclaredType::None {
        if config.show_all_possible_field_types {
            None // handled by caller's fallback enumeration below
        } else {
            render_fallback(raw)
        }
    } else {
        // Schema named a type incompatible with the observed wire type.
        None
    };

    let mut node = match rendered {
        Some(value) => Node::leaf(field_label(tag.field_number, &field_name, &value), span, value),
        None if declared != DeclaredType::None && !compatible => {
            let mut n = Node::interior(format!("{}: <type mismatch>", tag.field_number), span);
            n.add_diagnostic(ExpertInfoKind::FailedParseField);
            n
        }
        // Declared type is wire-compatible, but rendering it still failed —
        // today this is only BOOL on a multi-byte varint. This is a known
        // field, not an unresolved one: keep its real name, commit no
        // fabricated value, and flag it rather than silently guessing a
        // schema-less interpretation for a field the schema did resolve.
        None if declared != DeclaredType::None && compatible => {
            let mut n = Node::interior(field_label_text(tag.field_number, &field_name, "<unrenderable>"), span);
            n.add_diagnostic(ExpertInfoKind::FailedParseField);
            n
        }
        None => {
            // Schema-less fallback, possibly enumerating every plausible type.
            if let Some(wire_type) = wire_type_of(raw) {
                build_fallback_node(tag.field_number, wire_type, raw, span, config)
            } else {
                Node::interior(format!("{}: <unrenderable>", tag.field_number), span)
            }
        }
    };

    attach_pseudo_children(&mut node, field_start, enclosing, &field_name, declared);
    node
}

fn wire_type_of(raw: &RawValue<'_>) -> Option<WireType> {
    match raw {
        RawValue::Varint(..) => Some(WireType::Varint),
        RawValue::Fixed64(_) => Some(WireType::Fixed64),
        RawValue::Fixed32(_) => Some(WireType::Fixed32),
        RawValue::Bytes(_) => Some(WireType::LengthDelimited),
    }
}

/// With `show_all_possible_field_types` on, render the value under every
/// declared type the wire type admits, as sibling children of one field
/// node, since a single rendering can't carry N typed values.
fn build_fallback_node(field_number: u32, wire_type: WireType, raw: &RawValue<'_>, span: ByteSpan, config: &Config) -> Node {
    if config.show_all_possible_field_types {
        let mut node = Node::interior(format!("{field_number}: <unresolved field>"), span);
        for candidate in types::permitted_declared_types(wire_type) {
            if let Some(value) = render(*candidate, raw, |_| None) {
                node.push_child(Node::leaf(format!("as {}", candidate.name()), span, value));
            }
        }
        node
    } else {
        match render_fallback(raw) {
            Some(value) => Node::leaf(format!("{field_number}: {value}"), span, value),
            None => Node::interior(format!("{field_number}: <unrenderable>"), span),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_length_delimited_field(
    tag: &crate::tag::Tag,
    field_name: Option<std::string::String>,
    declared: DeclaredType,
    field: Option<&prost_reflect::FieldDescriptor>,
    enclosing: Option<MessageDescriptor>,
    payload: ByteRange<'_>,
    payload_base_offset: usize,
    field_start: usize,
    total_len: usize,
    config: &Config,
) -> Node {
    let span = ByteSpan::new(field_start, total_len);

    let is_packed_candidate = field.map(schema::is_packed_repeated).unwrap_or(false)
        && matches!(
            declared,
            DeclaredType::Int32
                | DeclaredType::Int64
                | DeclaredType::Uint32
                | DeclaredType::Uint64
                | DeclaredType::Sint32
                | DeclaredType::Sint64
                | DeclaredType::Bool
                | DeclaredType::Enum
                | DeclaredType::Fixed32
                | DeclaredType::Fixed64
                | DeclaredType::Sfixed32
                | DeclaredType::Sfixed64
                | DeclaredType::Float
                | DeclaredType::Double
        );

    let mut node = if is_packed_candidate {
        match packed::expand(payload, declared, |n| field.and_then(|f| schema::enum_value_name(f, n))) {
            Ok(elements) => {
                let joined = elements.iter().map(|e| e.value.to_string()).collect::<Vec<_>>().join(",");
                let mut repeated = Node::interior(
                    field_label_text(tag.field_number, &field_name, &format!("[{joined}]")),
                    span,
                );
                for element in elements {
                    let element_span = ByteSpan::new(payload_base_offset + element.offset, element.len);
                    let label = element.value.to_string();
                    repeated.push_child(Node::leaf(label, element_span, element.value));
                }
                repeated
            }
            Err(PackedExpandError::UnsupportedType) => {
                let mut n = raw_bytes_leaf(tag.field_number, &field_name, payload, span, config);
                n.add_diagnostic(ExpertInfoKind::WireTypeNotSupportPackedRepeated);
                n
            }
            Err(PackedExpandError::Truncated) => {
                let mut n = raw_bytes_leaf(tag.field_number, &field_name, payload, span, config);
                n.add_diagnostic(ExpertInfoKind::FailedParsePackedRepeatedField);
                n
            }
        }
    } else if matches!(declared, DeclaredType::Message | DeclaredType::Group) {
        // Group is the legacy proto2 spelling of "nested message" and
        // recurses identically; `schema::nested_message` never actually
        // sees `Group` in practice since `prost_reflect::Kind` surfaces
        // group fields as `Message`, but the dispatch covers it in case
        // that ever changes.
        match field.and_then(schema::nested_message) {
            Some(nested) => {
                let mut message_node = decode_message(payload, payload_base_offset, Some(&nested), config);
                message_node.label = field_label_text(tag.field_number, &field_name, &message_node.label);
                message_node.span = span;
                message_node
            }
            None => {
                let mut n = raw_bytes_leaf(tag.field_number, &field_name, payload, span, config);
                n.add_diagnostic(ExpertInfoKind::MessageTypeNotFound);
                n
            }
        }
    } else if declared == DeclaredType::None && config.try_dissect_as_string {
        // Schema-less length-delimited field: probe for a nested message
        // shape first only when the caller is not forcing string display.
        render_unresolved_length_delimited(tag.field_number, &field_name, payload, span, config)
    } else if declared != DeclaredType::None {
        let raw = RawValue::Bytes(payload.as_slice());
        match render(declared, &raw, |n| field.map(|f| schema::enum_value_name(f, n)).flatten()) {
            Some(value) => Node::leaf(field_label(tag.field_number, &field_name, &value), span, value),
            None => {
                let mut n = raw_bytes_leaf(tag.field_number, &field_name, payload, span, config);
                n.add_diagnostic(ExpertInfoKind::FailedParseField);
                n
            }
        }
    } else {
        render_unresolved_length_delimited(tag.field_number, &field_name, payload, span, config)
    };

    attach_pseudo_children(&mut node, field_start, enclosing, &field_name, declared);
    node
}

fn render_unresolved_length_delimited(
    field_number: u32,
    field_name: &Option<std::string::String>,
    payload: ByteRange<'_>,
    span: ByteSpan,
    config: &Config,
) -> Node {
    if config.show_all_possible_field_types {
        let raw = RawValue::Bytes(payload.as_slice());
        let mut node = Node::interior(format!("{field_number}: <unresolved field>"), span);
        for candidate in types::permitted_declared_types(WireType::LengthDelimited) {
            if let Some(value) = render(*candidate, &raw, |_| None) {
                node.push_child(Node::leaf(format!("as {}", candidate.name()), span, value));
            }
        }
        node
    } else if config.try_dissect_as_string {
        match std::str::from_utf8(payload.as_slice()) {
            Ok(s) => Node::leaf(field_label_text(field_number, field_name, s), span, RenderedValue::String(s.to_string())),
            Err(_) => raw_bytes_leaf(field_number, field_name, payload, span, config),
        }
    } else {
        raw_bytes_leaf(field_number, field_name, payload, span, config)
    }
}

fn raw_bytes_leaf(
    field_number: u32,
    field_name: &Option<std::string::String>,
    payload: ByteRange<'_>,
    span: ByteSpan,
    config: &Config,
) -> Node {
    let bytes = payload.as_slice().to_vec();
    let mut node = Node::leaf(
        field_label_text(field_number, field_name, "<bytes>"),
        span,
        RenderedValue::Bytes(bytes.clone()),
    );
    if config.dissect_bytes_as_string {
        node.push_child(Node::pseudo("As String", span.offset, crate::value::render_bytes_as_string(&bytes)));
    }
    node
}

fn field_label(field_number: u32, field_name: &Option<std::string::String>, value: &RenderedValue) -> std::string::String {
    field_label_text(field_number, field_name, &value.to_string())
}

fn field_label_text(field_number: u32, field_name: &Option<std::string::String>, rendered: &str) -> std::string::String {
    match field_name {
        Some(name) => format!("{name}: {rendered}"),
        None => format!("{field_number}: {rendered}"),
    }
}

fn attach_pseudo_children(
    node: &mut Node,
    anchor: usize,
    message: Option<prost_reflect::MessageDescriptor>,
    field_name: &Option<std::string::String>,
    declared: DeclaredType,
) {
    if let Some(message) = message {
        node.push_child(Node::pseudo("Message Name", anchor, RenderedValue::String(message.full_name().to_string())));
    }
    if let Some(name) = field_name {
        node.push_child(Node::pseudo("Field Name", anchor, RenderedValue::String(name.clone())));
    }
    node.push_child(Node::pseudo("Field Type", anchor, RenderedValue::String(declared.name().to_string())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        field_descriptor_proto::{Label, Type},
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    };

    fn pool_with_sample() -> prost_reflect::DescriptorPool {
        let count_field = FieldDescriptorProto {
            name: Some("count".into()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Int32 as i32),
            ..Default::default()
        };
        let message = DescriptorProto {
            name: Some("Sample".into()),
            field: vec![count_field],
            ..Default::default()
        };
        let file = FileDescriptorProto {
            name: Some("sample.proto".into()),
            package: Some("pkg".into()),
            message_type: vec![message],
            syntax: Some("proto3".into()),
            ..Default::default()
        };
        prost_reflect::DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] }).unwrap()
    }

    #[test]
    fn decodes_scalar_varint_field_with_schema() {
        let pool = pool_with_sample();
        let message = pool.get_message_by_name("pkg.Sample").unwrap();
        // field 1, varint, value 150
        let buf = [0x08, 0x96, 0x01];
        let range = ByteRange::new(&buf);
        let config = Config::default();
        match decode_field(range, 0, 0, Some(&message), &config) {
            FieldOutcome::Decoded { node, consumed } => {
                assert_eq!(consumed, 3);
                assert_eq!(node.value, Some(RenderedValue::Int32(150)));
            }
            FieldOutcome::Failed { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn malformed_tag_halts_with_wire_type_invalid() {
        // field 1, wire type 6 (reserved)
        let buf = [0x0E];
        let range = ByteRange::new(&buf);
        let config = Config::default();
        match decode_field(range, 0, 0, None, &config) {
            FieldOutcome::Failed { kind, .. } => assert_eq!(kind, ExpertInfoKind::WireTypeInvalid),
            FieldOutcome::Decoded { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn truncated_varint_value_fails_field() {
        let buf = [0x08, 0x96]; // tag ok, value varint truncated
        let range = ByteRange::new(&buf);
        let config = Config::default();
        match decode_field(range, 0, 0, None, &config) {
            FieldOutcome::Failed { kind, .. } => assert_eq!(kind, ExpertInfoKind::FailedParseField),
            FieldOutcome::Decoded { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn schema_less_field_falls_back_without_halting() {
        let buf = [0x08, 0x05]; // field 1, varint, value 5, no schema
        let range = ByteRange::new(&buf);
        let config = Config::default();
        match decode_field(range, 0, 0, None, &config) {
            FieldOutcome::Decoded { node, consumed } => {
                assert_eq!(consumed, 2);
                assert_eq!(node.value, Some(RenderedValue::Uint32(5)));
            }
            FieldOutcome::Failed { .. } => panic!("fallback rendering should not halt"),
        }
    }

    fn pool_with_bool_field() -> prost_reflect::DescriptorPool {
        let flag_field = FieldDescriptorProto {
            name: Some("flag".into()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Bool as i32),
            ..Default::default()
        };
        let message = DescriptorProto {
            name: Some("Sample".into()),
            field: vec![flag_field],
            ..Default::default()
        };
        let file = FileDescriptorProto {
            name: Some("sample.proto".into()),
            package: Some("pkg".into()),
            message_type: vec![message],
            syntax: Some("proto3".into()),
            ..Default::default()
        };
        prost_reflect::DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] }).unwrap()
    }

    #[test]
    fn bool_field_with_multi_byte_varint_keeps_field_name_and_flags_no_value() {
        let pool = pool_with_bool_field();
        let message = pool.get_message_by_name("pkg.Sample").unwrap();
        // field 1, varint, value 1 encoded as a needlessly long 2-byte varint
        let buf = [0x08, 0x81, 0x00];
        let range = ByteRange::new(&buf);
        let config = Config::default();
        match decode_field(range, 0, 0, Some(&message), &config) {
            FieldOutcome::Decoded { node, consumed } => {
                assert_eq!(consumed, 3);
                assert_eq!(node.value, None, "a multi-byte bool varint must not fabricate a value");
                assert!(node.label.contains("flag"), "the resolved field name must be kept: {:?}", node.label);
                assert_eq!(node.diagnostics[0].kind, ExpertInfoKind::FailedParseField);
            }
            FieldOutcome::Failed { .. } => panic!("a rendering failure should not halt the enclosing message"),
        }
    }
}
