//! `FixedLayout` is this crate's analogue of `sargerust_files`'s
//! `Parseable` trait: read one little-endian, fixed-size value from a
//! `Read`. Unlike the chunk tree itself (which needs variable-width
//! length prefixes and container/leaf branching, see `chunk::reader`),
//! everything in here has a byte width known up front, which is what lets
//! `getProperty<T>` (spec §4.2) turn a leaf's raw payload into `Vec<T>` by
//! plain integer division.

use crate::ParserError;
use std::io::Read;

pub trait FixedLayout: Sized {
    fn read_le<R: Read>(rdr: &mut R) -> Result<Self, ParserError>;
}

/// The wire width of a `FixedLayout` type, needed because `getProperty<T>`
/// (spec §4.2) computes `payload.len() / sizeof(T)` and Rust gives no
/// layout guarantee for tuples that we'd want to rely on for that.
pub trait WireWidth {
    const SIZE: usize;
}

impl WireWidth for u8 {
    const SIZE: usize = 1;
}
impl WireWidth for bool {
    const SIZE: usize = 1;
}
impl WireWidth for u16 {
    const SIZE: usize = 2;
}
impl WireWidth for i32 {
    const SIZE: usize = 4;
}
impl WireWidth for u32 {
    const SIZE: usize = 4;
}
impl WireWidth for f32 {
    const SIZE: usize = 4;
}
impl WireWidth for (f32, f32, f32) {
    const SIZE: usize = 12;
}
impl WireWidth for crate::common::types::ClassData {
    const SIZE: usize = 16;
}

impl FixedLayout for bool {
    fn read_le<R: Read>(rdr: &mut R) -> Result<bool, ParserError> {
        let mut buf = [0u8; 1];
        rdr.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }
}

impl FixedLayout for (f32, f32, f32) {
    fn read_le<R: Read>(rdr: &mut R) -> Result<(f32, f32, f32), ParserError> {
        Ok((f32::read_le(rdr)?, f32::read_le(rdr)?, f32::read_le(rdr)?))
    }
}

/// Reads a length-known run of `T` from a byte slice, stopping after
/// `slice.len() / T::SIZE` elements. Used by `getProperty<T>` and by any
/// param-block array that is a flat run of same-sized records.
pub(crate) fn read_fixed_array<T: FixedLayout + WireWidth>(payload: &[u8]) -> Vec<T> {
    let count = payload.len() / T::SIZE;
    let mut cursor = std::io::Cursor::new(payload);
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        match T::read_le(&mut cursor) {
            Ok(value) => out.push(value),
            Err(_) => break,
        }
    }
    out
}

/// Decodes a null-terminated UTF-16LE string from a leaf payload (spec §6:
/// "embedded strings are null-terminated UTF-16 LE"). UTF-16 decoding is an
/// external collaborator per spec §1, but doing it with `char::decode_utf16`
/// keeps the library self-contained for testing without pulling in a
/// dedicated encoding crate for two lines of logic.
pub(crate) fn read_utf16_cstring(payload: &[u8]) -> String {
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
