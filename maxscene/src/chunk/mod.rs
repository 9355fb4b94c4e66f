pub mod reader;
pub mod types;

pub use reader::parse;
pub use types::{Chunk, ChunkBody, ClassDecoration};
