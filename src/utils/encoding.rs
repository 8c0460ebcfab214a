use anyhow::{Result, bail};
use std::io::{self, Read, Write};

/// Width of the integers stored in collaborator files (`.pa`, `.colex_m`, `.lcs`)
pub const STORE_SIZE: usize = 5;

/// Largest value representable in `STORE_SIZE` bytes
pub const STORE_MAX: u64 = (1u64 << (8 * STORE_SIZE)) - 1;

/// Binary persistence for index sections.
///
/// Every section writes explicit little-endian fields, so an index written on
/// one platform loads on any other.
pub trait Persist: Sized {
    /// Serialize into `writer`, returning the number of bytes written
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64>;

    /// Deserialize from `reader`
    fn read_from<R: Read>(reader: &mut R) -> Result<Self>;
}

/// Number of bits needed to represent `x` (1 for zero)
#[inline]
pub fn bit_width(x: u64) -> u32 {
    if x == 0 { 1 } else { 64 - x.leading_zeros() }
}

/// Decode the `i`-th 5-byte little-endian integer of `bytes`
#[inline]
pub fn read_u40_at(bytes: &[u8], i: usize) -> u64 {
    let start = i * STORE_SIZE;
    decode_u40(&bytes[start..start + STORE_SIZE])
}

#[inline]
fn decode_u40(chunk: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..STORE_SIZE].copy_from_slice(chunk);
    u64::from_le_bytes(buf)
}

/// Iterate over a stream of 5-byte little-endian integers
pub fn iter_u40(bytes: &[u8]) -> impl ExactSizeIterator<Item = u64> + '_ {
    bytes.chunks_exact(STORE_SIZE).map(decode_u40)
}

/// Check that `bytes` holds a whole number of 5-byte integers
pub fn check_u40_stream(bytes: &[u8], what: &str) -> Result<usize> {
    if bytes.len() % STORE_SIZE != 0 {
        bail!(
            "{} has {} bytes, not a multiple of {}",
            what,
            bytes.len(),
            STORE_SIZE
        );
    }
    Ok(bytes.len() / STORE_SIZE)
}

/// Write a 5-byte little-endian integer
pub fn write_u40_le<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    debug_assert!(value <= STORE_MAX);
    writer.write_all(&value.to_le_bytes()[..STORE_SIZE])
}

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u32 in little-endian format
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Write a u64 in little-endian format
pub fn write_u64_le<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u64 in little-endian format
pub fn read_u64_le<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a length-prefixed slice of words. Returns bytes written.
pub fn write_words<W: Write>(writer: &mut W, words: &[u64]) -> io::Result<u64> {
    write_u64_le(writer, words.len() as u64)?;
    // Batch words to reduce write calls
    let mut buffer = Vec::with_capacity(8 * 1024);
    for &word in words {
        buffer.extend_from_slice(&word.to_le_bytes());
        if buffer.len() >= 8 * 1024 {
            writer.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        writer.write_all(&buffer)?;
    }
    Ok(8 + 8 * words.len() as u64)
}

/// Read a length-prefixed vector of words
pub fn read_words<R: Read>(reader: &mut R) -> Result<Vec<u64>> {
    let len = read_u64_le(reader)? as usize;
    // A corrupt length must not turn into a huge allocation up front
    let mut words = Vec::with_capacity(len.min(1 << 20));
    let mut buf = [0u8; 8];
    for _ in 0..len {
        reader.read_exact(&mut buf)?;
        words.push(u64::from_le_bytes(buf));
    }
    Ok(words)
}

/// Read a usize stored as u64, rejecting values that do not fit
pub fn read_usize_le<R: Read>(reader: &mut R) -> Result<usize> {
    let value = read_u64_le(reader)?;
    match usize::try_from(value) {
        Ok(v) => Ok(v),
        Err(_) => bail!("stored length {} does not fit in usize", value),
    }
}
