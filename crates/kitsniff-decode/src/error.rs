/// Errors that can occur while decoding a payload.
///
/// Truncated packets are not errors; they decode to a shorter layer list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The payload text is not valid hex.
    #[error("invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The payload text held no bytes.
    #[error("empty payload")]
    EmptyPayload,
}

pub type Result<T> = std::result::Result<T, DecodeError>;
