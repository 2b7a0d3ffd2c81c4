/// Errors from decoding a short code.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The code contains a byte outside the alphabet.
    #[error("invalid code: byte 0x{byte:02x} at position {position} is not a code symbol")]
    InvalidCode { byte: u8, position: usize },

    /// The code is well-formed but its value does not fit in a `u64`.
    #[error("invalid code: value overflows a 64-bit id")]
    Overflow,
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
