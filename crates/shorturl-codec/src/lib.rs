//! Reversible mapping between numeric ids and short, human-typable codes.
//!
//! A code is the base-[`BASE`] representation of an id, written most
//! significant symbol first over [`ALPHABET`]. The alphabet leaves out
//! vowels (so codes do not spell words) and characters that are easy to
//! confuse when read aloud or retyped (`0`/`O`, `1`/`l`/`I`, `5`, `s`).
//! Upper and lower case letters are distinct symbols.
//!
//! The mapping is a bijection between ids `>= 1` and non-empty codes without
//! a leading `'2'` (the zero symbol). Id `0` encodes to the empty string;
//! stores never hand it out because allocation starts at a floor `>= 1`.

pub mod alphabet;
pub mod error;

pub use alphabet::{symbol_value, ALPHABET, BASE, MAX_CODE_LEN};
pub use error::{CodecError, CodecResult};

/// Encode an id as a short code.
///
/// Total over `u64`. `encode(0)` is the empty string.
pub fn encode(mut id: u64) -> String {
    let mut buf = [0u8; MAX_CODE_LEN];
    let mut len = 0;
    while id > 0 {
        buf[len] = ALPHABET[(id % BASE) as usize];
        id /= BASE;
        len += 1;
    }
    buf[..len].reverse();
    // Every symbol is ASCII.
    buf[..len].iter().map(|&b| b as char).collect()
}

/// Decode a short code back into its id.
///
/// Fails with [`CodecError::InvalidCode`] on the first byte outside the
/// alphabet, and with [`CodecError::Overflow`] when an otherwise valid code
/// is too long to fit in a `u64`.
pub fn decode(code: &str) -> CodecResult<u64> {
    let mut id: u64 = 0;
    for (position, &byte) in code.as_bytes().iter().enumerate() {
        let value = symbol_value(byte).ok_or(CodecError::InvalidCode { byte, position })?;
        id = id
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(u64::from(value)))
            .ok_or(CodecError::Overflow)?;
    }
    Ok(id)
}

/// Returns `true` if every byte of `code` is an alphabet symbol.
///
/// The empty string is valid (it is the encoding of id `0`).
pub fn validate(code: &str) -> bool {
    code.bytes().all(|b| symbol_value(b).is_some())
}
