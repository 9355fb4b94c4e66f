//! Non-fatal diagnostics (spec §7). The original source reports these
//! through a single `log(fmt, ...) -> int` callback; the idiomatic Rust
//! shape is a small trait object callers can swap, with a `log`-crate
//! backed default and a collecting implementation for tests.

use std::fmt;

/// One occurrence of a non-fatal condition from spec §7 (items 4-7).
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// §7.4 - an instance's chunk type has no entry in the `ClassDirectory`.
    UnknownClass { scene_index: usize, type_id: u16 },
    /// §7.5 - an expected property/sub-chunk is missing; the field is left at its default.
    MissingProperty { context: &'static str },
    /// §7.5 - a controller/object's (classID, superClassID) didn't match what was expected.
    ClassMismatch { context: &'static str, expected: &'static str },
    /// §7.6 - a face array ran out of bytes mid-record.
    CorruptFaceArray { array: &'static str },
    /// §7.7 - a node's declared parent-index hadn't been seen yet.
    ForwardParentRef { parent_index: u32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownClass { scene_index, type_id } => {
                write!(f, "Scene index {scene_index}: class type {type_id:04X} is not supported")
            }
            Diagnostic::MissingProperty { context } => {
                write!(f, "{context} is missing")
            }
            Diagnostic::ClassMismatch { context, expected } => {
                write!(f, "{context}: expected {expected}")
            }
            Diagnostic::CorruptFaceArray { array } => write!(f, "{array} is corrupted"),
            Diagnostic::ForwardParentRef { parent_index } => {
                write!(f, "Parent {parent_index} is not found")
            }
        }
    }
}

/// Sink for non-fatal diagnostics raised while decoding.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade at `warn` level, the
/// idiom used throughout the rest of this workspace for non-fatal
/// conditions.
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Collects diagnostics in order, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics(pub Vec<Diagnostic>);

impl Diagnostics for CollectingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }
}
