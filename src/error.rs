//! The expert-info diagnostic taxonomy: a closed set of decode-failure
//! kinds, each with a fixed severity, attached to tree nodes rather than
//! raised as exceptions. No failure here aborts decoding — it only
//! annotates the node where it happened.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExpertInfoKind {
    #[error("failed to parse a field's tag varint")]
    FailedParseTag,
    #[error("wire type is invalid, reserved, or unsupported for this field")]
    WireTypeInvalid,
    #[error("failed to parse a length-delimited field's length prefix or payload")]
    FailedParseLengthDelimitedField,
    #[error("failed to parse a field's value")]
    FailedParseField,
    #[error("nested message's type descriptor could not be resolved")]
    MessageTypeNotFound,
    #[error("declared type does not support packed-repeated encoding")]
    WireTypeNotSupportPackedRepeated,
    #[error("failed to parse a packed-repeated field's elements")]
    FailedParsePackedRepeatedField,
}

impl ExpertInfoKind {
    pub fn severity(self) -> Severity {
        use ExpertInfoKind::*;
        match self {
            MessageTypeNotFound | WireTypeInvalid => Severity::Warning,
            FailedParseTag
            | FailedParseLengthDelimitedField
            | FailedParseField
            | WireTypeNotSupportPackedRepeated
            | FailedParsePackedRepeatedField => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertInfo {
    pub kind: ExpertInfoKind,
    pub severity: Severity,
}

impl ExpertInfo {
    pub fn new(kind: ExpertInfoKind) -> Self {
        ExpertInfo {
            severity: kind.severity(),
            kind,
        }
    }
}
