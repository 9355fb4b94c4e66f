//! The recursive, length-prefixed chunk parser (spec §4.1). Grounded on
//! `IffChunk::read_next_chunk` in `sargerust_files::common::types` for the
//! "read header, slice out the body, advance" shape; generalized here
//! because `.max` chunks need a variable-width length prefix (`u32` or,
//! when that field is `0`, a following `u64`) and a high-bit flag that
//! marks a chunk as a container instead of every chunk being an opaque
//! leaf blob.

use crate::ParserError;
use crate::chunk::types::{Chunk, ChunkBody};

const HEADER_LEN: usize = 6; // u16 type + u32 length32
const EXT_HEADER_LEN: usize = HEADER_LEN + 8; // + u64 length64
const CONTAINER_BIT_32: u32 = 1 << 31;
const CONTAINER_BIT_64: u64 = 1 << 63;

/// Parses a full buffer into its top-level sibling chunk list. Recurses
/// into container bodies via the same sibling-loop logic.
pub fn parse(bytes: &[u8]) -> Result<Vec<Chunk>, ParserError> {
    parse_range(bytes, 0, bytes.len())
}

fn parse_range(data: &[u8], begin: usize, end: usize) -> Result<Vec<Chunk>, ParserError> {
    let mut chunks = Vec::new();
    let mut cursor = begin;

    loop {
        if end.saturating_sub(cursor) < HEADER_LEN {
            break;
        }
        let header_start = cursor;

        let type_id = u16::from_le_bytes([data[cursor], data[cursor + 1]]);
        let length32 = u32::from_le_bytes(data[cursor + 2..cursor + 6].try_into().unwrap());
        cursor += HEADER_LEN;

        let (is_container, effective_length) = if length32 == 0 {
            if end.saturating_sub(header_start) < EXT_HEADER_LEN {
                break;
            }
            let length64 = u64::from_le_bytes(data[cursor..cursor + 8].try_into().unwrap());
            cursor += 8;
            if length64 == 0 {
                // Sentinel: terminate the sibling loop at this level.
                break;
            }
            if length64 & CONTAINER_BIT_64 != 0 {
                (true, length64 & !CONTAINER_BIT_64)
            } else {
                (false, length64)
            }
        } else if length32 & CONTAINER_BIT_32 != 0 {
            (true, (length32 & !CONTAINER_BIT_32) as u64)
        } else {
            (false, length32 as u64)
        };

        let chunk_end = header_start as u64 + effective_length;
        if chunk_end > end as u64 {
            break;
        }
        let chunk_end = chunk_end as usize;
        let header_end = cursor;
        if chunk_end < header_end {
            // Effective length shorter than the header it's supposed to
            // include: nothing sane to slice. Stop, keep what we have.
            break;
        }

        let body = if is_container {
            ChunkBody::Container(parse_range(data, header_end, chunk_end)?)
        } else {
            ChunkBody::Leaf(data[header_end..chunk_end].to_vec())
        };

        chunks.push(Chunk {
            type_id,
            body,
            decoration: None,
        });
        cursor = chunk_end;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::types::ChunkBody;

    fn leaf32(type_id: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&type_id.to_le_bytes());
        out.extend_from_slice(&((6 + payload.len()) as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn container32(type_id: u16, children: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&type_id.to_le_bytes());
        let len = (6 + children.len()) as u32 | CONTAINER_BIT_32;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(children);
        out
    }

    #[test]
    fn zero_length_payload_is_a_leaf_with_empty_bytes() -> anyhow::Result<()> {
        let bytes = leaf32(0x1234, &[]);
        let chunks = parse(&bytes)?;
        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0].body, ChunkBody::Leaf(ref p) if p.is_empty()));
        Ok(())
    }

    #[test]
    fn length_sentinel_of_zero_terminates_sibling_loop() -> anyhow::Result<()> {
        let mut bytes = leaf32(0x0001, &[1, 2, 3]);
        // A zero-length32 followed by a zero-length64 sentinel.
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        // Trailing sibling after the sentinel must NOT be parsed.
        bytes.extend_from_slice(&leaf32(0x0002, &[9]));

        let chunks = parse(&bytes)?;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].type_id, 0x0001);
        Ok(())
    }

    #[test]
    fn nested_containers_preserve_order_and_structure() -> anyhow::Result<()> {
        let inner = [leaf32(0x10, &[1]), leaf32(0x11, &[2, 2])].concat();
        let bytes = container32(0x20, &inner);
        let chunks = parse(&bytes)?;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_container());
        let kids = chunks[0].children();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].type_id, 0x10);
        assert_eq!(kids[1].type_id, 0x11);
        Ok(())
    }

    #[test]
    fn chunk_spans_cover_input_up_to_small_trailer() -> anyhow::Result<()> {
        let mut bytes = leaf32(0x01, &[0xAA; 4]);
        bytes.extend_from_slice(&leaf32(0x02, &[0xBB; 2]));
        let trailer = [0xFFu8; 3];
        bytes.extend_from_slice(&trailer);

        let chunks = parse(&bytes)?;
        assert_eq!(chunks.len(), 2);
        // Both chunks parsed; only the <=5 byte trailer is unconsumed.
        Ok(())
    }

    #[test]
    fn truncated_header_terminates_without_error() -> anyhow::Result<()> {
        let bytes = [0x01, 0x00, 0x02]; // 3 bytes, short of the 6-byte header
        let chunks = parse(&bytes)?;
        assert!(chunks.is_empty());
        Ok(())
    }

    #[test]
    fn high_bit_64_marks_container() -> anyhow::Result<()> {
        let inner = leaf32(0x30, &[7, 7, 7]);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0040u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let total_len = (14 + inner.len()) as u64 | CONTAINER_BIT_64;
        bytes.extend_from_slice(&total_len.to_le_bytes());
        bytes.extend_from_slice(&inner);

        let chunks = parse(&bytes)?;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_container());
        assert_eq!(chunks[0].children().len(), 1);
        Ok(())
    }
}
