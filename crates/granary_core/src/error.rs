use thiserror::Error;

use crate::GrainType;

/// Failures raised by the storage engine.
///
/// Running short of stock or free capacity is not an error: those outcomes
/// come back as amounts, remainders, or `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no further element")]
    NoSuchElement,
    #[error("cursor has no yielded element to remove")]
    InvalidCursorState,
    #[error("silo holds {held}, cannot store {offered}")]
    GrainTypeMismatch { held: GrainType, offered: GrainType },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown grain type '{0}'")]
pub struct ParseGrainTypeError(pub String);
