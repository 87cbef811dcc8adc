//! Resolves an optional message-type hint (or a UDP port mapping) against
//! the schema, then hands the whole buffer to the message decoder.

use prost_reflect::{DescriptorPool, MessageDescriptor};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::message::decode_message;
use crate::schema;
use crate::tree::{ByteSpan, Node};
use crate::wire::ByteRange;

/// Which half of a gRPC method's signature a hint string selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodSide {
    Request,
    Response,
}

/// A hint string, parsed into one of its two recognized forms: a bare
/// message name, or a gRPC method path plus which side of it to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParsedHint {
    Direct { full_name: std::string::String },
    GrpcMethod { full_method_name: std::string::String, side: MethodSide },
}

/// Out-of-band transport context the dispatcher needs when no hint string is
/// present: only UDP packets fall back to the port table.
#[derive(Debug, Clone, Copy)]
pub enum Transport {
    Udp { port: u16 },
    Other,
}

/// Parses a hint string's *syntax*, independent of whether the pool actually
/// has the named message/method. Unlike pool lookup, which degrades to
/// "absent" for a well-formed hint naming something unknown, a hint that
/// doesn't match either recognized form at all is a caller error worth
/// surfacing loudly — this is the one place in the dispatcher where
/// `anyhow` earns its keep, for a caller-facing, non-decode failure.
fn parse_hint(hint: &str) -> anyhow::Result<ParsedHint> {
    if let Some(full_name) = hint.strip_prefix("message,") {
        return Ok(ParsedHint::Direct { full_name: full_name.to_string() });
    }

    let mut parts = hint.splitn(3, ',');
    let _content_type = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("empty hint string"))?;
    let service_method = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("hint {hint:?} is missing a service/method segment"))?;
    let side = match parts.next() {
        Some("request") => MethodSide::Request,
        Some(_) => MethodSide::Response,
        None => return Err(anyhow::anyhow!("hint {hint:?} is missing a request/response segment")),
    };

    let service_method = service_method.strip_prefix('/').unwrap_or(service_method);
    if !service_method.contains('/') {
        return Err(anyhow::anyhow!(
            "hint {hint:?} service/method segment {service_method:?} has no '/' separator"
        ));
    }
    let full_method_name = service_method.replace('/', ".");
    Ok(ParsedHint::GrpcMethod { full_method_name, side })
}

/// Resolves `hint` against `pool`. Returns `None` if the hint doesn't parse,
/// or parses but names something the pool doesn't have — in every case the
/// dispatcher falls through to an unresolved (schema-less) decode rather
/// than failing the whole call.
pub fn resolve_hint(hint: &str, pool: &DescriptorPool) -> Option<MessageDescriptor> {
    match parse_hint(hint) {
        Ok(ParsedHint::Direct { full_name }) => pool.get_message_by_name(&full_name),
        Ok(ParsedHint::GrpcMethod { full_method_name, side }) => {
            let method = schema::find_method(pool, &full_method_name)?;
            Some(match side {
                MethodSide::Request => method.input(),
                MethodSide::Response => method.output(),
            })
        }
        Err(error) => {
            debug!(%error, hint, "hint string did not parse, decoding schema-less");
            None
        }
    }
}

/// Decodes `bytes` end to end. `hint` is the out-of-band message-type hint
/// channel; when absent and `transport` names a UDP port, the configured
/// `udp_message_types` table supplies a default message type. Descriptor
/// resolution failure at every step degrades to schema-less decoding rather
/// than aborting — hint resolution only ever *narrows* which message type
/// is used, it never gates whether decoding happens at all.
#[instrument(skip(bytes, pool, config), fields(hint = ?hint))]
pub fn decode(
    bytes: &[u8],
    hint: Option<&str>,
    transport: Transport,
    pool: Option<&DescriptorPool>,
    config: &Config,
) -> Node {
    let descriptor = resolve_message_type(hint, transport, pool, config);
    if descriptor.is_none() {
        debug!("no message type resolved, decoding schema-less");
    }

    let range = ByteRange::new(bytes);
    let message = decode_message(range, 0, descriptor.as_ref(), config);
    let mut root = Node::interior("ProtoBuf", ByteSpan::new(0, bytes.len()));
    root.push_child(message);
    root
}

/// Decodes `bytes` against a message type the caller already knows by full
/// name, skipping hint parsing and transport-based resolution entirely.
pub fn decode_known(bytes: &[u8], message_full_name: &str, pool: &DescriptorPool, config: &Config) -> Node {
    let descriptor = pool.get_message_by_name(message_full_name);
    let range = ByteRange::new(bytes);
    let message = decode_message(range, 0, descriptor.as_ref(), config);
    let mut root = Node::interior("ProtoBuf", ByteSpan::new(0, bytes.len()));
    root.push_child(message);
    root
}

fn resolve_message_type(
    hint: Option<&str>,
    transport: Transport,
    pool: Option<&DescriptorPool>,
    config: &Config,
) -> Option<MessageDescriptor> {
    let pool = pool?;
    if let Some(hint) = hint {
        return resolve_hint(hint, pool);
    }
    match transport {
        Transport::Udp { port } => {
            let full_name = config.message_type_for_udp_port(port)?;
            pool.get_message_by_name(full_name)
        }
        Transport::Other => None,
    }
}
