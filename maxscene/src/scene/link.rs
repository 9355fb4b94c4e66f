//! Inter-instance references (spec §4.2's `LinkMap`, `getLink`,
//! `getLinkChunk`). Two coexisting encodings on the same chunk are merged
//! into one `slot -> scene-index` map; type `0x2035`'s pairs win over
//! `0x2034`'s positional entries for the same slot.

use std::collections::HashMap;

use crate::chunk::types::Chunk;
use crate::scene::ScenePool;
use crate::scene::accessors::get_property;

pub type LinkMap = HashMap<u32, u32>;

const LINK_POSITIONAL: u16 = 0x2034;
const LINK_PAIRS: u16 = 0x2035;

/// Builds a chunk's `LinkMap` from its `0x2034`/`0x2035` properties.
/// Idempotent: re-running it on the same chunk yields an equal map, since
/// it only reads, never mutates, the chunk.
pub fn get_link(chunk: &Chunk) -> LinkMap {
    let mut map = LinkMap::new();

    let positional: Vec<u32> = get_property(chunk, &[LINK_POSITIONAL]);
    for (slot, target) in positional.into_iter().enumerate() {
        map.insert(slot as u32, target);
    }

    let pairs: Vec<u32> = get_property(chunk, &[LINK_PAIRS]);
    // First element is a count/header, ignored; the rest are (slot, target) pairs.
    let mut iter = pairs.into_iter().skip(1);
    while let (Some(slot), Some(target)) = (iter.next(), iter.next()) {
        map.insert(slot, target);
    }

    map
}

/// Walks the link graph: for each slot in sequence, follows `chunk`'s
/// link map to the next chunk, recomputing the map fresh at each hop.
/// Returns `None` on any missing slot or out-of-range scene index.
pub fn get_link_chunk<'a>(pool: &'a ScenePool, chunk: &'a Chunk, slots: &[u32]) -> Option<&'a Chunk> {
    let mut current = chunk;
    for &slot in slots {
        let map = get_link(current);
        let target = *map.get(&slot)?;
        current = pool.get(target as usize)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::types::ChunkBody;

    fn leaf(type_id: u16, payload: Vec<u8>) -> Chunk {
        Chunk { type_id, body: ChunkBody::Leaf(payload), decoration: None }
    }
    fn container(type_id: u16, children: Vec<Chunk>) -> Chunk {
        Chunk { type_id, body: ChunkBody::Container(children), decoration: None }
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn positional_and_pair_encodings_merge_with_pairs_winning() {
        let chunk = container(
            0x01,
            vec![
                leaf(LINK_POSITIONAL, u32s(&[10, 11, 12])),
                leaf(LINK_PAIRS, u32s(&[/*count*/ 1, /*slot*/ 1, /*target*/ 99])),
            ],
        );

        let map = get_link(&chunk);
        assert_eq!(map.get(&0), Some(&10));
        assert_eq!(map.get(&1), Some(&99)); // overridden
        assert_eq!(map.get(&2), Some(&12));
    }

    #[test]
    fn get_link_is_idempotent() {
        let chunk = container(0x01, vec![leaf(LINK_POSITIONAL, u32s(&[5, 6]))]);
        assert_eq!(get_link(&chunk), get_link(&chunk));
    }
}
