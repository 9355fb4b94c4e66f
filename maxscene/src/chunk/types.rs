//! The parsed tag-tree (spec §3 "Chunk", §4.1). Exactly one of `body`'s
//! variants is populated per chunk - enforced by construction, unlike the
//! C original's tagged-union-in-practice.

/// Post-class-resolution decorations, populated only for top-level scene
/// chunks by `scene::class` (spec §3, §4.3).
#[derive(Debug, Clone, Default)]
pub struct ClassDecoration {
    pub class_name: String,
    pub class_data: Option<crate::common::types::ClassData>,
    pub class_dll_file: String,
    pub class_dll_name: String,
}

#[derive(Debug, Clone)]
pub enum ChunkBody {
    Leaf(Vec<u8>),
    Container(Vec<Chunk>),
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub type_id: u16,
    pub body: ChunkBody,
    pub decoration: Option<ClassDecoration>,
}

impl Chunk {
    pub fn children(&self) -> &[Chunk] {
        match &self.body {
            ChunkBody::Container(children) => children,
            ChunkBody::Leaf(_) => &[],
        }
    }

    pub fn payload(&self) -> &[u8] {
        match &self.body {
            ChunkBody::Leaf(payload) => payload,
            ChunkBody::Container(_) => &[],
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.body, ChunkBody::Container(_))
    }

    /// Hex-formatted display name, as spec §4.1 step 7 requires for
    /// tree-viewer presentation (kept here even though rendering a tree
    /// view is out of scope, since it's cheap and other callers - tests,
    /// diagnostics - want a human-readable tag too).
    pub fn display_name(&self) -> String {
        format!("{:#06X}", self.type_id)
    }
}
