use crate::ApiLevel;
use thiserror::Error;

/// Errors that abort the remapping of a class.
#[derive(Error, Debug)]
pub enum RemapError {
    #[error("Invalid descriptor {descriptor:?} at offset {position}: {reason}")]
    InvalidDescriptor { descriptor: String, position: usize, reason: &'static str },
    #[error("Invalid signature {signature:?} at offset {position}: {reason}")]
    InvalidSignature { signature: String, position: usize, reason: &'static str },
    #[error("Remapped name {symbol:?} cannot be used as a class name")]
    InvalidSymbol { symbol: String },
    #[error("Class {class} is malformed: {reason}")]
    MalformedClass { class: String, reason: &'static str },
    #[error("Unsupported constant value kind (tag {tag})")]
    UnsupportedValue { tag: u8 },
    #[error("Class file version {major}.{minor} is newer than {api:?} supports")]
    UnsupportedClassVersion { major: u16, minor: u16, api: ApiLevel },
    #[error("{feature} requires a newer api level than {api:?}")]
    UnsupportedFeature { feature: &'static str, api: ApiLevel },
    #[error(transparent)]
    Policy(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RemapError {
    /// Wraps an error raised by a `Remapper` implementation.
    pub fn policy<E>(err: E) -> RemapError where E: Into<Box<dyn std::error::Error + Send + Sync>> {
        RemapError::Policy(err.into())
    }
}

pub type Result<T> = ::std::result::Result<T, RemapError>;
