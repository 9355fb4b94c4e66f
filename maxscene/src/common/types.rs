//! Small fixed-layout value types shared across the chunk tree and the
//! scene resolver. Named after what they hold rather than after the
//! original C++ structs, per this workspace's naming convention
//! (`C3Vector`/`CArgb` in `sargerust-files` are the exception because they
//! mirror a public wiki vocabulary; nothing analogous exists here).

use crate::ParserError;
use crate::common::reader::FixedLayout;
use byteorder::{LittleEndian, ReadBytesExt};
use maxscene_derive::FixedLayout;
use std::io::Read;

/// A 3-component float tuple, used for positions, scales and RGB/point3
/// param-block values alike (spec §4.5's "(f32,f32,f32)" property type).
pub type Vec3 = (f32, f32, f32);

/// A 64-bit class identity split into two 32-bit halves, per spec's GLOSSARY.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, FixedLayout)]
pub struct ClassId {
    pub a: u32,
    pub b: u32,
}

impl ClassId {
    pub const fn new(a: u32, b: u32) -> Self {
        ClassId { a, b }
    }
}

/// The `ClassData` record decoded from a `ClassDirectory` entry's subtype
/// `0x2060` leaf (spec §3, §4.3).
#[derive(Debug, Copy, Clone, FixedLayout)]
pub struct ClassData {
    pub dll_index: u32,
    pub class_id: ClassId,
    pub super_class_id: u32,
}

impl ClassData {
    pub const INTERNAL_DLL: u32 = 0xFFFF_FFFF;
}

impl FixedLayout for u8 {
    fn read_le<R: Read>(rdr: &mut R) -> Result<u8, ParserError> {
        Ok(rdr.read_u8()?)
    }
}

impl FixedLayout for u16 {
    fn read_le<R: Read>(rdr: &mut R) -> Result<u16, ParserError> {
        Ok(rdr.read_u16::<LittleEndian>()?)
    }
}

impl FixedLayout for i32 {
    fn read_le<R: Read>(rdr: &mut R) -> Result<i32, ParserError> {
        Ok(rdr.read_i32::<LittleEndian>()?)
    }
}

impl FixedLayout for u32 {
    fn read_le<R: Read>(rdr: &mut R) -> Result<u32, ParserError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl FixedLayout for f32 {
    fn read_le<R: Read>(rdr: &mut R) -> Result<f32, ParserError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}
