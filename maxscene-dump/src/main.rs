//! Thin inspection CLI over `maxscene`, grounded on `sargerust`'s
//! `main.rs`/`settings` split and `mpq-rust`'s single-binary inspection
//! convention. Everything here - compound-file access, gzip unwrapping - is
//! the external collaborator the library itself stays free of (spec §6).

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use maxscene::{DecodeError, LogDiagnostics, RawStreams};

#[derive(Parser, Debug)]
#[command(name = "maxscene-dump")]
#[command(about = "Decodes a .max scene container and prints its node tree")]
struct CliArgs {
    #[command(subcommand)]
    input: Input,
}

#[derive(Subcommand, Debug)]
enum Input {
    /// Reads the six scene streams directly out of a `.max` OLE compound file.
    Archive { path: PathBuf },
    /// Reads the six streams from a directory of already-extracted files,
    /// one per OLE stream name (`Scene`, `ClassDirectory`, `DllDirectory`,
    /// ...). Useful for feeding hand-built fixtures without a real compound
    /// file.
    Streams { dir: PathBuf },
}

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let streams = match &args.input {
        Input::Archive { path } => open_compound_file(path),
        Input::Streams { dir } => read_stream_dir(dir),
    };

    let streams = match streams {
        Ok(streams) => streams,
        Err(err) => {
            eprintln!("failed to read streams: {err}");
            std::process::exit(1);
        }
    };

    let mut diag = LogDiagnostics;
    match maxscene::decode_scene(&streams, &mut diag) {
        Ok(root) => print_node(&root, 0),
        Err(DecodeError::EmptyScene) => eprintln!("scene stream is empty"),
        Err(DecodeError::UnsupportedSceneType { type_id }) => {
            eprintln!("scene type {type_id:04X} is not supported")
        }
        Err(DecodeError::Parser(err)) => eprintln!("parse error: {err}"),
    }
}

fn print_node(node: &maxscene::scene::hierarchy::SceneNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}{} pos={:?} rot={:?} scale={:?} verts={}",
        node.name,
        node.position,
        node.rotation,
        node.scale,
        node.vertices.len()
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

const STREAM_NAMES: [(&str, fn(&mut RawStreams) -> &mut Vec<u8>); 7] = [
    ("ClassData", |s| &mut s.class_data),
    ("ClassDirectory", |s| &mut s.class_directory),
    ("ClassDirectory3", |s| &mut s.class_directory3),
    ("Config", |s| &mut s.config),
    ("DllDirectory", |s| &mut s.dll_directory),
    ("Scene", |s| &mut s.scene),
    ("VideoPostQueue", |s| &mut s.video_post_queue),
];

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Unwraps an optional gzip prefix (spec §6: some streams are gzip-prefixed
/// in newer file versions). Streams without the magic are passed through
/// untouched.
fn maybe_ungzip(bytes: Vec<u8>) -> std::io::Result<Vec<u8>> {
    if bytes.len() < 2 || bytes[0..2] != GZIP_MAGIC {
        return Ok(bytes);
    }
    let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Opens a real `.max` OLE/CFB compound file and extracts the six named
/// streams `maxscene` operates on. Not part of the library: the library
/// takes already-extracted buffers (spec §6).
fn open_compound_file(path: &std::path::Path) -> std::io::Result<RawStreams> {
    let mut file = cfb::open(path)?;
    let mut streams = RawStreams::default();

    for (name, field) in STREAM_NAMES {
        let mut buf = Vec::new();
        match file.open_stream(name) {
            Ok(mut stream) => {
                stream.read_to_end(&mut buf)?;
                *field(&mut streams) = maybe_ungzip(buf)?;
            }
            Err(_) => log::debug!("stream {name} not present in {}", path.display()),
        }
    }

    Ok(streams)
}

/// Reads the six streams from a plain directory, one file per OLE stream
/// name. Missing files are left empty (mirroring `RawStreams::default()`);
/// only `Scene` and `DllDirectory` are actually required by `decode_scene`.
fn read_stream_dir(dir: &std::path::Path) -> std::io::Result<RawStreams> {
    let mut streams = RawStreams::default();
    for (name, field) in STREAM_NAMES {
        let candidate = dir.join(name);
        if candidate.is_file() {
            *field(&mut streams) = maybe_ungzip(fs::read(candidate)?)?;
        }
    }
    Ok(streams)
}
