//! Decoder for the `.max` scene container family (3ds Max 9 through 2018).
//!
//! This crate covers the CORE described by the format: a recursive,
//! length-prefixed chunk parser (`chunk`) and a semantic resolver
//! (`scene`) that turns the parsed `Scene` stream into a tree of
//! [`scene::hierarchy::SceneNode`]. Compound-file (OLE/CFB) extraction,
//! gzip decompression and UTF-16 decoding are external collaborators and
//! are not implemented here; see `maxscene-dump` for a minimal caller
//! that wires those in.

use thiserror::Error;

pub mod chunk;
pub mod common;
pub mod diagnostics;
pub mod scene;

pub use diagnostics::{CollectingDiagnostics, Diagnostic, Diagnostics, LogDiagnostics};

/// Errors from the chunk parser (§4.1). The parser's own policy for
/// truncated/malformed regions is to stop and keep what it already parsed
/// (spec §7 item 2-3 style handling lives one layer up, in `DecodeError`);
/// `ParserError` only covers preconditions under which even that graceful
/// truncation can't produce a usable tree.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Source contains no data")]
    EmptySource,

    #[error("The stream is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

/// Fatal errors from the scene resolver (§4.3, §7 items 1 and 3). All other
/// error kinds in spec §7 are non-fatal and go through [`Diagnostics`]
/// instead of this type.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("Scene stream is empty")]
    EmptyScene,

    #[error("Scene type {type_id:04X} is not supported")]
    UnsupportedSceneType { type_id: u16 },
}

/// The six named, already-decompressed, already-UTF8-safe byte buffers a
/// compound-file reader would hand back for a `.max` file (spec §2 step 1-2
/// and §6). `ClassDirectory3` takes priority over `ClassDirectory` when both
/// are present; only one is required.
#[derive(Debug, Default, Clone)]
pub struct RawStreams {
    pub class_data: Vec<u8>,
    pub class_directory: Vec<u8>,
    pub class_directory3: Vec<u8>,
    pub config: Vec<u8>,
    pub dll_directory: Vec<u8>,
    pub scene: Vec<u8>,
    pub video_post_queue: Vec<u8>,
}

impl RawStreams {
    /// Prefers `ClassDirectory3` when present, per spec §6.
    pub fn class_directory(&self) -> &[u8] {
        if !self.class_directory3.is_empty() {
            &self.class_directory3
        } else {
            &self.class_directory
        }
    }
}

/// Runs the whole pipeline: parses the relevant streams into chunk trees,
/// resolves class/DLL identity, and assembles the node hierarchy. This is
/// the one entry point most callers need; `chunk::parse` and
/// `scene::ScenePool::resolve` are exposed separately for callers that want
/// the intermediate chunk tree (e.g. a tree-viewer UI).
pub fn decode_scene(streams: &RawStreams, diag: &mut dyn Diagnostics) -> Result<scene::hierarchy::SceneNode, DecodeError> {
    let class_dir_chunks = chunk::parse(streams.class_directory())?;
    let dll_dir_chunks = chunk::parse(&streams.dll_directory)?;
    let scene_chunks = chunk::parse(&streams.scene)?;

    let pool = scene::ScenePool::resolve(scene_chunks, &class_dir_chunks, &dll_dir_chunks, diag)?;
    Ok(scene::hierarchy::assemble(&pool, diag))
}
