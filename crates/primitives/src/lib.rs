//! Core text types for tagging: versioned snapshots, spans, line ranges, and
//! forward span tracking across edits.

/// Versioned documents and their immutable snapshots.
pub mod document;
/// Text range types: char and line indices.
pub mod range;
/// Rope utilities and extensions.
pub mod rope;
/// Char spans and whole-line ranges anchored to a snapshot.
pub mod span;
/// Forward-trackable spans.
pub mod tracking;
/// Edit primitives: change sets and position mapping.
pub mod transaction;

pub use document::{Document, DocumentId, EditError, Snapshot};
pub use range::{CharIdx, CharLen, LineRange};
pub use ropey::{Rope, RopeSlice};
pub use span::{SnapshotLineRange, Span};
pub use tracking::{Projection, TrackingSpan};
pub use transaction::{Bias, Change, ChangeSet};
