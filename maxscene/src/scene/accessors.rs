//! Typed property and descendant-path lookups (spec §4.2), the
//! generalization of `get_mandatory_chunk_by_name`/`get_optional_chunk_by_name`
//! in `sargerust_files::common::reader` to a numeric, nesting-aware chunk
//! tree instead of a flat list of four-character tags.

use crate::chunk::types::Chunk;
use crate::common::reader::{FixedLayout, WireWidth, read_fixed_array, read_utf16_cstring};

/// Walks a descendant *path*: at each nesting level, takes the first child
/// with the matching type. `getChunk(root, typeA, typeB, ...)` in spec §4.2.
pub fn get_chunk<'a>(root: &'a Chunk, path: &[u16]) -> Option<&'a Chunk> {
    let mut current = root;
    for &type_id in path {
        current = current.children().iter().find(|c| c.type_id == type_id)?;
    }
    Some(current)
}

/// Same walk, but starting from a flat list of siblings instead of a
/// single root (e.g. a `ScenePool`'s top-level instance array).
pub fn get_chunk_in<'a>(siblings: &'a [Chunk], path: &[u16]) -> Option<&'a Chunk> {
    let (&first, rest) = path.split_first()?;
    let root = siblings.iter().find(|c| c.type_id == first)?;
    get_chunk(root, rest)
}

/// Tries each candidate type in order against `chunk`'s *direct* children,
/// and reinterprets the first matching leaf's payload as `Vec<T>`.
/// `getProperty<T>(chunk, types...)` in spec §4.2. Returns an empty vec
/// when no candidate type is present.
pub fn get_property<T: FixedLayout + WireWidth>(chunk: &Chunk, types: &[u16]) -> Vec<T> {
    for &type_id in types {
        if let Some(leaf) = chunk
            .children()
            .iter()
            .find(|c| c.type_id == type_id && !c.is_container())
        {
            return read_fixed_array::<T>(leaf.payload());
        }
    }
    Vec::new()
}

/// Convenience over `get_property::<u16>` for UTF-16 string properties
/// (spec §4.2's `u16` case, used for class/DLL/node names and descriptor
/// text).
pub fn get_property_string(chunk: &Chunk, types: &[u16]) -> Option<String> {
    for &type_id in types {
        if let Some(leaf) = chunk
            .children()
            .iter()
            .find(|c| c.type_id == type_id && !c.is_container())
        {
            return Some(read_utf16_cstring(leaf.payload()));
        }
    }
    None
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

    #[test]
    fn get_chunk_walks_nested_path() {
        let leaf_chunk = leaf(0x30, vec![1, 2, 3, 4]);
        let mid = container(0x20, vec![leaf_chunk]);
        let root = container(0x10, vec![mid]);

        let found = get_chunk(&root, &[0x20, 0x30]).unwrap();
        assert_eq!(found.type_id, 0x30);
    }

    #[test]
    fn get_property_falls_back_through_candidates() {
        let root = container(
            0x10,
            vec![leaf(0x2504, 2.0f32.to_le_bytes().to_vec())],
        );
        let values: Vec<f32> = get_property(&root, &[0x2501, 0x2503, 0x2504, 0x2505]);
        assert_eq!(values, vec![2.0]);
    }

    #[test]
    fn get_property_returns_empty_when_absent() {
        let root = container(0x10, vec![]);
        let values: Vec<u32> = get_property(&root, &[0x0960]);
        assert!(values.is_empty());
    }
}
