//! Node-tree assembly (spec §4.6, "pass 2"). Iterates the already-resolved
//! `ScenePool` in scene order, keeps only `BASENODE`-derived instances, and
//! wires each into its declared parent by scene-index.

use std::collections::HashMap;

use crate::chunk::types::Chunk;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::scene::ScenePool;
use crate::scene::accessors::{get_property, get_property_string};
use crate::scene::geometry::{self, Geometry};
use crate::scene::transform::{self, Transform};

const SUPER_BASENODE: u32 = 0x0001;
const PARENT_INDEX: u16 = 0x0960;
const NODE_NAME: u16 = 0x0962;
const DESCRIPTOR_TEXT: u16 = 0x0120;

/// One node in the resolved scene tree (spec §4.6 `SceneNode`).
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub vertices: Vec<(f32, f32, f32)>,
    pub texture_coords: Vec<(f32, f32, f32)>,
    pub normals: Vec<(f32, f32, f32)>,
    pub vertex_color: Vec<(f32, f32, f32)>,
    pub vertex_alpha: Vec<(f32, f32, f32)>,
    pub vertex_face_array: Vec<Vec<u32>>,
    pub texture_face_array: Vec<Vec<u32>>,
    pub text: String,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    fn new(name: String, transform: Transform, geometry: Geometry) -> Self {
        SceneNode {
            name,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            vertices: geometry.vertices,
            texture_coords: geometry.texture_coords,
            normals: geometry.normals,
            vertex_color: geometry.vertex_color,
            vertex_alpha: geometry.vertex_alpha,
            vertex_face_array: geometry.vertex_face_array,
            texture_face_array: geometry.texture_face_array,
            text: geometry.text,
            children: Vec::new(),
        }
    }

    fn root() -> Self {
        SceneNode::new("(Root)".to_string(), Transform::default(), Geometry::default())
    }
}

fn class_id_matches_basenode(chunk: &Chunk) -> bool {
    chunk
        .decoration
        .as_ref()
        .and_then(|d| d.class_data.as_ref())
        .map(|d| d.super_class_id == SUPER_BASENODE)
        .unwrap_or(false)
}

fn node_name(chunk: &Chunk) -> String {
    get_property_string(chunk, &[NODE_NAME])
        .or_else(|| chunk.decoration.as_ref().map(|d| d.class_name.clone()))
        .unwrap_or_else(|| "(Unnamed)".to_string())
}

fn descriptor_text(chunk: &Chunk) -> Option<String> {
    get_property_string(chunk, &[DESCRIPTOR_TEXT])
}

/// Assembles the full node tree from a resolved pool (spec §4.6). Every
/// `BASENODE`-derived instance becomes a `SceneNode`; everything else (an
/// undecorated instance, or one whose class didn't resolve to `BASENODE`)
/// is simply not visited. A node's declared parent-index that hasn't been
/// seen yet (forward reference) attaches it under the synthetic root and
/// reports spec §7.7's diagnostic instead of failing the whole assembly.
pub fn assemble(pool: &ScenePool, diag: &mut dyn Diagnostics) -> SceneNode {
    let mut nodes: HashMap<usize, SceneNode> = HashMap::new();
    let mut parent_of: HashMap<usize, Option<usize>> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();

    for (scene_index, chunk) in pool.iter() {
        if !class_id_matches_basenode(chunk) {
            continue;
        }

        let transform = transform::extract_transform(pool, chunk, diag);
        let geometry = geometry::extract_geometry(pool, chunk, diag);
        let mut node = SceneNode::new(node_name(chunk), transform, geometry);
        if let Some(text) = descriptor_text(chunk) {
            node.text = text;
        }

        let parent_index: Option<usize> = get_property::<u32>(chunk, &[PARENT_INDEX])
            .into_iter()
            .next()
            .map(|v| v as usize);

        nodes.insert(scene_index, node);
        parent_of.insert(scene_index, parent_index);
        order.push(scene_index);
    }

    let mut root = SceneNode::root();
    let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut root_children: Vec<usize> = Vec::new();

    for &scene_index in &order {
        match parent_of[&scene_index] {
            // A parent is only valid if its scene-index is numerically
            // smaller than this node's (spec.md §3): the source builds
            // nodes in one incremental pass, so a later-declared instance
            // is never a visible parent, even if it would otherwise match.
            Some(parent_index) if parent_index < scene_index && nodes.contains_key(&parent_index) => {
                children_of.entry(parent_index).or_default().push(scene_index);
            }
            Some(parent_index) => {
                diag.report(Diagnostic::ForwardParentRef { parent_index: parent_index as u32 });
                root_children.push(scene_index);
            }
            None => root_children.push(scene_index),
        }
    }

    fn attach(
        scene_index: usize,
        nodes: &mut HashMap<usize, SceneNode>,
        children_of: &HashMap<usize, Vec<usize>>,
    ) -> SceneNode {
        let mut node = nodes.remove(&scene_index).expect("scene_index present in nodes");
        if let Some(child_indices) = children_of.get(&scene_index) {
            for &child_index in child_indices {
                node.children.push(attach(child_index, nodes, children_of));
            }
        }
        node
    }

    for scene_index in root_children {
        if nodes.contains_key(&scene_index) {
            root.children.push(attach(scene_index, &mut nodes, &children_of));
        }
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::types::{ChunkBody, ClassDecoration};
    use crate::common::types::{ClassData, ClassId};
    use crate::diagnostics::CollectingDiagnostics;

    fn leaf(type_id: u16, payload: Vec<u8>) -> Chunk {
        Chunk { type_id, body: ChunkBody::Leaf(payload), decoration: None }
    }

    fn basenode(parent_index: Option<u32>, children: Vec<Chunk>) -> Chunk {
        let mut kids = children;
        if let Some(p) = parent_index {
            kids.push(leaf(PARENT_INDEX, p.to_le_bytes().to_vec()));
        }
        Chunk {
            type_id: 0,
            body: ChunkBody::Container(kids),
            decoration: Some(ClassDecoration {
                class_name: "Box001".to_string(),
                class_data: Some(ClassData { dll_index: ClassData::INTERNAL_DLL, class_id: ClassId::new(0x10, 0), super_class_id: SUPER_BASENODE }),
                class_dll_file: "(Internal)".to_string(),
                class_dll_name: "(Internal)".to_string(),
            }),
        }
    }

    #[test]
    fn single_root_node_attaches_under_synthetic_root() {
        let pool = ScenePool::resolve(
            vec![Chunk { type_id: 0x200E, body: ChunkBody::Container(vec![basenode(None, vec![])]), decoration: None }],
            &[],
            &[],
            &mut CollectingDiagnostics::default(),
        )
        .unwrap();

        let mut diag = CollectingDiagnostics::default();
        let root = assemble(&pool, &mut diag);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "Box001");
    }

    #[test]
    fn forward_parent_reference_attaches_to_root_and_reports() {
        // Child at scene-index 1 declares parent index 2, which doesn't
        // exist until later in iteration order -- and never resolves here.
        let child = basenode(Some(2), vec![]);
        let pool = ScenePool::resolve(
            vec![Chunk { type_id: 0x200E, body: ChunkBody::Container(vec![child]), decoration: None }],
            &[],
            &[],
            &mut CollectingDiagnostics::default(),
        )
        .unwrap();

        let mut diag = CollectingDiagnostics::default();
        let root = assemble(&pool, &mut diag);
        assert_eq!(root.children.len(), 1);
        assert!(diag.0.iter().any(|d| matches!(d, Diagnostic::ForwardParentRef { parent_index: 2 })));
    }

    #[test]
    fn parent_index_pointing_to_a_later_scene_index_is_still_a_forward_reference() {
        // scene-index 0 declares parent 1, a real basenode -- but declared
        // *after* it. Even though 1 resolves to a real node, it must still
        // be rejected as a forward reference (spec.md §3: parent scene-index
        // must be numerically smaller).
        let first = basenode(Some(1), vec![]);
        let second = basenode(None, vec![]);
        let pool = ScenePool::resolve(
            vec![Chunk { type_id: 0x200E, body: ChunkBody::Container(vec![first, second]), decoration: None }],
            &[],
            &[],
            &mut CollectingDiagnostics::default(),
        )
        .unwrap();

        let mut diag = CollectingDiagnostics::default();
        let root = assemble(&pool, &mut diag);
        // Both nodes end up directly under the root: the forward-referencing
        // node is reattached, not linked under its numerically-later parent.
        assert_eq!(root.children.len(), 2);
        assert!(diag.0.iter().any(|d| matches!(d, Diagnostic::ForwardParentRef { parent_index: 1 })));
    }

    #[test]
    fn non_basenode_instances_are_skipped() {
        let non_node = Chunk {
            type_id: 0,
            body: ChunkBody::Container(vec![]),
            decoration: Some(ClassDecoration {
                class_name: "Material".to_string(),
                class_data: Some(ClassData { dll_index: ClassData::INTERNAL_DLL, class_id: ClassId::new(0x01, 0), super_class_id: 0x0003 }),
                class_dll_file: "(Internal)".to_string(),
                class_dll_name: "(Internal)".to_string(),
            }),
        };
        let pool = ScenePool::resolve(
            vec![Chunk { type_id: 0x200E, body: ChunkBody::Container(vec![non_node]), decoration: None }],
            &[],
            &[],
            &mut CollectingDiagnostics::default(),
        )
        .unwrap();

        let mut diag = CollectingDiagnostics::default();
        let root = assemble(&pool, &mut diag);
        assert!(root.children.is_empty());
    }
}
