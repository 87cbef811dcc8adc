//! A read-only wrapper over `prost_reflect`'s descriptor pool. This crate
//! never builds a `DescriptorPool` itself — that belongs to the host's
//! `.proto`/descriptor-set loader — it only queries one that's handed in.

use prost_reflect::{Cardinality, DescriptorPool, FieldDescriptor, Kind, MessageDescriptor, MethodDescriptor};

use crate::types::DeclaredType;

pub fn declared_type(field: &FieldDescriptor) -> DeclaredType {
    use DeclaredType::*;
    match field.kind() {
        Kind::Double => Double,
        Kind::Float => Float,
        Kind::Int32 => Int32,
        Kind::Int64 => Int64,
        Kind::Uint32 => Uint32,
        Kind::Uint64 => Uint64,
        Kind::Sint32 => Sint32,
        Kind::Sint64 => Sint64,
        Kind::Fixed32 => Fixed32,
        Kind::Fixed64 => Fixed64,
        Kind::Sfixed32 => Sfixed32,
        Kind::Sfixed64 => Sfixed64,
        Kind::Bool => Bool,
        Kind::String => String,
        Kind::Bytes => Bytes,
        Kind::Message(_) => Message,
        Kind::Enum(_) => Enum,
    }
}

pub fn nested_message(field: &FieldDescriptor) -> Option<MessageDescriptor> {
    match field.kind() {
        Kind::Message(m) => Some(m),
        _ => None,
    }
}

/// A repeated field is decoded with the packed-repeated expander iff the
/// descriptor says so — `is_packed` already accounts for proto3's
/// "repeated scalar fields are packed by default" rule.
pub fn is_packed_repeated(field: &FieldDescriptor) -> bool {
    field.cardinality() == Cardinality::Repeated && field.is_packed()
}

pub fn enum_value_name(field: &FieldDescriptor, number: i32) -> Option<std::string::String> {
    match field.kind() {
        Kind::Enum(e) => e.get_value(number).map(|v| v.name().to_string()),
        _ => None,
    }
}

/// Resolves a gRPC method's full name (`package.Service.Method`) against the
/// pool. The entry dispatcher splits this into input/output message types.
pub fn find_method(pool: &DescriptorPool, full_method_name: &str) -> Option<MethodDescriptor> {
    let (service_name, method_name) = full_method_name.rsplit_once('.')?;
    pool.get_service_by_name(service_name)?
        .methods()
        .find(|m| m.name() == method_name)
}
