/// Code symbols in value order: `ALPHABET[v]` is the symbol for digit `v`.
pub const ALPHABET: &[u8] = b"2346789BCDFGHJKLMNPQRSTVWXYZbcdfghjkmnpqrtvwxyz";

/// Radix of the code representation.
pub const BASE: u64 = ALPHABET.len() as u64;

/// Length of the longest code, the encoding of `u64::MAX`.
pub const MAX_CODE_LEN: usize = 12;

/// Marks a byte that is not an alphabet symbol.
const NOT_A_SYMBOL: u8 = 0xFF;

/// Byte -> digit value, or [`NOT_A_SYMBOL`].
static REVERSE: [u8; 256] = build_reverse();

const fn build_reverse() -> [u8; 256] {
    let mut table = [NOT_A_SYMBOL; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Digit value of `byte`, or `None` if it is not in the alphabet.
#[inline]
pub fn symbol_value(byte: u8) -> Option<u8> {
    match REVERSE[byte as usize] {
        NOT_A_SYMBOL => None,
        v => Some(v),
    }
}
