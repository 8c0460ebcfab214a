//! DNA alphabet and its 2-bit codes.
//!
//! Codes are assigned in ASCII order (A=0, C=1, G=2, T=3). Samples are sorted
//! colexicographically by ASCII symbol while binary search compares decoded
//! symbols, and the window keys of the dictionary search compare codes, so
//! both orders must coincide.

/// Symbols in code order
pub const SYMBOLS: [u8; 4] = *b"ACGT";

/// Bits per packed symbol
pub const SYMBOL_BITS: u32 = 2;

const INVALID: u8 = 0xFF;

const CODES: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < SYMBOLS.len() {
        table[SYMBOLS[i] as usize] = i as u8;
        table[SYMBOLS[i].to_ascii_lowercase() as usize] = i as u8;
        i += 1;
    }
    table
};

/// 2-bit code of a DNA symbol, case-insensitive
#[inline]
pub fn encode(symbol: u8) -> Option<u8> {
    match CODES[symbol as usize] {
        INVALID => None,
        code => Some(code),
    }
}

/// Upper-case symbol of a 2-bit code
#[inline]
pub fn decode(code: u64) -> u8 {
    SYMBOLS[(code & 3) as usize]
}

/// Offset of the first byte that is not a DNA symbol
pub fn find_invalid(text: &[u8]) -> Option<usize> {
    text.iter().position(|&b| encode(b).is_none())
}
