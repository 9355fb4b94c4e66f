//! The semantic interpretation pass over a parsed `Scene` stream (spec
//! §4.3-§4.6): resolves class identity, decodes links, and reassembles the
//! transform/geometry node hierarchy.

pub mod accessors;
pub mod class;
pub mod geometry;
pub mod hierarchy;
pub mod link;
pub mod transform;

use crate::DecodeError;
use crate::chunk::types::{Chunk, ChunkBody, ClassDecoration};
use crate::diagnostics::{Diagnostic, Diagnostics};

/// The resolved `Scene` stream: an index-addressable array of
/// class-instance chunks (spec §3's `ScenePool`). Index `i` is this
/// instance's "scene-index", the unit links and parent references are
/// expressed in.
#[derive(Debug, Default)]
pub struct ScenePool {
    instances: Vec<Chunk>,
}

impl ScenePool {
    pub fn get(&self, scene_index: usize) -> Option<&Chunk> {
        self.instances.get(scene_index)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Chunk)> {
        self.instances.iter().enumerate()
    }

    /// Pass 1 of the two linear passes spec §5 guarantees: validates the
    /// scene-root type, then decorates every top-level instance with its
    /// class/DLL identity. Unresolvable instances are left undecorated and
    /// reported (spec §7.4); pass 2 (`hierarchy::assemble`) naturally skips
    /// them since it only builds nodes for decorated `BASENODE` instances.
    pub fn resolve(
        scene_chunks: Vec<Chunk>,
        class_dir_chunks: &[Chunk],
        dll_dir_chunks: &[Chunk],
        diag: &mut dyn Diagnostics,
    ) -> Result<ScenePool, DecodeError> {
        let mut iter = scene_chunks.into_iter();
        let root = iter.next().ok_or(DecodeError::EmptyScene)?;

        if !class::is_supported_scene_root_type(root.type_id) {
            return Err(DecodeError::UnsupportedSceneType { type_id: root.type_id });
        }

        let mut instances = match root.body {
            ChunkBody::Container(children) => children,
            ChunkBody::Leaf(_) => return Err(DecodeError::EmptyScene),
        };
        if instances.is_empty() {
            return Err(DecodeError::EmptyScene);
        }

        for (scene_index, instance) in instances.iter_mut().enumerate() {
            let type_id = instance.type_id;
            match class::get_class(class_dir_chunks, type_id as usize) {
                Some(info) => {
                    let (dll_file, dll_name) = class::get_dll(dll_dir_chunks, info.data.dll_index);
                    instance.decoration = Some(ClassDecoration {
                        class_name: info.name,
                        class_data: Some(info.data),
                        class_dll_file: dll_file,
                        class_dll_name: dll_name,
                    });
                }
                None => diag.report(Diagnostic::UnknownClass { scene_index, type_id }),
            }
        }

        Ok(ScenePool { instances })
    }
}
