//! Drives the field decoder over a bounded byte range until it's exhausted
//! or a field fails.

use prost_reflect::MessageDescriptor;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::ExpertInfoKind;
use crate::field::{decode_field, FieldOutcome};
use crate::tree::{ByteSpan, Node};
use crate::wire::ByteRange;

/// Decodes a single message occupying `range` in full. `base_offset` is
/// `range`'s position in the original top-level buffer, so every emitted
/// span is reported in absolute terms regardless of recursion depth.
///
/// Terminal states: a clean end (cursor reaches `range.len()`) or a
/// field-parse failure, which halts this message only — already-emitted
/// children are kept and returned to the caller.
pub fn decode_message(
    range: ByteRange<'_>,
    base_offset: usize,
    descriptor: Option<&MessageDescriptor>,
    config: &Config,
) -> Node {
    let label = descriptor
        .map(|d| format!("Message: {}", d.full_name()))
        .unwrap_or_else(|| "<UNKNOWN> Message Type".to_string());
    let span = ByteSpan::new(base_offset, range.len());
    let mut node = Node::interior(label, span);

    let message_name = descriptor.map(|d| d.full_name()).unwrap_or("<unknown>");
    let span = tracing::debug_span!("decode_message", message = message_name);
    let _enter = span.enter();

    let mut offset = 0;
    while offset < range.len() {
        match decode_field(range, offset, base_offset, descriptor, config) {
            FieldOutcome::Decoded { node: field_node, consumed } => {
                node.push_child(field_node);
                offset += consumed;
            }
            FieldOutcome::Failed { partial, kind } => {
                log_diagnostic(kind);
                match partial {
                    Some(mut field_node) => {
                        field_node.add_diagnostic(kind);
                        node.push_child(field_node);
                    }
                    None => node.add_diagnostic(kind),
                }
                break;
            }
        }
    }

    node
}

fn log_diagnostic(kind: ExpertInfoKind) {
    match kind.severity() {
        crate::error::Severity::Warning => warn!(?kind, "expert info"),
        crate::error::Severity::Error => error!(?kind, "expert info"),
    }
}
