//! Schema-optional Protocol Buffers wire-format decoder for packet-analysis
//! tools.
//!
//! Given an opaque byte buffer and, optionally, a message-type hint resolved
//! against a [`prost_reflect::DescriptorPool`], this crate decodes the
//! Protocol Buffers wire format into a labelled, hierarchical [`tree::Node`]
//! suitable for a packet dissector's display tree. Without a schema it
//! degrades gracefully, inferring plausible interpretations from the wire
//! type alone.
//!
//! The schema loader that builds a [`prost_reflect::DescriptorPool`] from
//! `.proto` sources, the host's preference-storage UI, and its tree-node /
//! expert-info / byte-range APIs are all out of scope — this crate only
//! consumes their interfaces (see [`config`], [`tree`], [`error`]).

pub mod config;
pub mod dispatch;
pub mod error;
pub mod field;
pub mod message;
pub mod packed;
pub mod schema;
pub mod tag;
pub mod tree;
pub mod types;
pub mod value;
pub mod wire;

pub use config::Config;
pub use dispatch::Transport;
pub use error::{ExpertInfo, ExpertInfoKind, Severity};
pub use tree::Node;

/// The core, in-memory entry point: decode `bytes`, optionally guided by a
/// `pb_msg_type`-style hint string and, for UDP packets with no hint, the
/// configured port → message-type table.
pub fn decode(
    bytes: &[u8],
    hint: Option<&str>,
    transport: Transport,
    pool: Option<&prost_reflect::DescriptorPool>,
    config: &Config,
) -> Node {
    dispatch::decode(bytes, hint, transport, pool, config)
}

/// Decode `bytes` as a known message type, skipping hint resolution — for
/// a caller that already knows the shape, mirroring a `parse_flat`-style
/// direct entry point.
pub fn decode_message(bytes: &[u8], message_full_name: &str, pool: &prost_reflect::DescriptorPool, config: &Config) -> Node {
    dispatch::decode_known(bytes, message_full_name, pool, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        field_descriptor_proto::{Label, Type},
        DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    };

    fn sample_pool() -> prost_reflect::DescriptorPool {
        let a = FieldDescriptorProto {
            name: Some("a".into()),
            number: Some(1),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Int32 as i32),
            ..Default::default()
        };
        let message = DescriptorProto {
            name: Some("M".into()),
            field: vec![a],
            ..Default::default()
        };
        let file = FileDescriptorProto {
            name: Some("m.proto".into()),
            package: Some("pkg".into()),
            message_type: vec![message],
            syntax: Some("proto3".into()),
            ..Default::default()
        };
        prost_reflect::DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] }).unwrap()
    }

    #[test]
    fn single_int32_field_decodes_with_schema() {
        let pool = sample_pool();
        let buf = [0x08, 0x96, 0x01];
        let config = Config::default();
        let root = decode(&buf, Some("message,pkg.M"), Transport::Other, Some(&pool), &config);
        let message = &root.children[0];
        let field = &message.children[0];
        assert_eq!(field.value, Some(value::RenderedValue::Int32(150)));
    }

    #[test]
    fn string_field_decodes_with_schema() {
        let string_field = FieldDescriptorProto {
            name: Some("s".into()),
            number: Some(2),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::String as i32),
            ..Default::default()
        };
        let message = DescriptorProto {
            name: Some("M".into()),
            field: vec![string_field],
            ..Default::default()
        };
        let file = FileDescriptorProto {
            name: Some("m.proto".into()),
            package: Some("pkg".into()),
            message_type: vec![message],
            syntax: Some("proto3".into()),
            ..Default::default()
        };
        let pool = prost_reflect::DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] }).unwrap();
        let buf = [0x12, 0x07, b't', b'e', b's', b't', b'i', b'n', b'g'];
        let config = Config::default();
        let root = decode(&buf, Some("message,pkg.M"), Transport::Other, Some(&pool), &config);
        let message = &root.children[0];
        let field = &message.children[0];
        assert_eq!(field.value, Some(value::RenderedValue::String("testing".to_string())));
        assert_eq!(field.span.len, 9);
    }

    #[test]
    fn unknown_field_fallback_enumerates_plausible_types() {
        let buf = [0x08, 0x96, 0x01];
        let mut config = Config::default();
        config.show_all_possible_field_types = true;
        let root = decode(&buf, None, Transport::Other, None, &config);
        let message = &root.children[0];
        let field = &message.children[0];
        assert_eq!(field.children.len(), 8);
    }

    #[test]
    fn malformed_tag_yields_empty_message_with_diagnostic() {
        let buf = [0xFFu8; 11];
        let config = Config::default();
        let root = decode(&buf, None, Transport::Other, None, &config);
        let message = &root.children[0];
        assert!(message.children.is_empty());
        assert_eq!(message.diagnostics[0].kind, ExpertInfoKind::FailedParseTag);
    }
}
