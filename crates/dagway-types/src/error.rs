use thiserror::Error;

/// Errors from parsing or decoding foundation types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A decoded value had the wrong length.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A block's bytes could not be decoded into a DAG node.
    #[error("node decode error: {0}")]
    Decode(String),
}
