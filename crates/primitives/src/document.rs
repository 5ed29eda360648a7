use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use ropey::{Rope, RopeSlice};

use crate::range::{CharIdx, CharLen};
use crate::transaction::{Change, ChangeSet};

/// Identifies one document across all of its snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

impl DocumentId {
	/// Allocates a process-unique document id.
	pub fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// Rejected edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
	#[error("change {start}..{end} is out of bounds for a document of {len} chars")]
	OutOfBounds { start: CharIdx, end: CharIdx, len: CharLen },
	#[error("change starting at {start} overlaps the previous change ending at {prev_end}")]
	Overlapping { start: CharIdx, prev_end: CharIdx },
}

/// Append-only edit log shared by every snapshot of one document.
///
/// Entry `v` transforms version `v` into version `v + 1`.
#[derive(Debug, Default)]
struct History {
	edits: RwLock<Vec<ChangeSet>>,
}

struct SnapshotInner {
	doc_id: DocumentId,
	version: u64,
	text: Rope,
	history: Arc<History>,
}

/// Immutable, versioned state of a document.
///
/// Cloning is cheap. Two snapshots are equal when they belong to the same
/// document and carry the same version; versions of one document are totally
/// ordered and newer snapshots can be reached from older ones through
/// [`Self::changes_to`].
#[derive(Clone)]
pub struct Snapshot {
	inner: Arc<SnapshotInner>,
}

impl Snapshot {
	pub fn doc_id(&self) -> DocumentId {
		self.inner.doc_id
	}

	pub fn version(&self) -> u64 {
		self.inner.version
	}

	pub fn text(&self) -> RopeSlice<'_> {
		self.inner.text.slice(..)
	}

	pub fn rope(&self) -> &Rope {
		&self.inner.text
	}

	pub fn len_chars(&self) -> CharLen {
		self.inner.text.len_chars()
	}

	/// Returns the number of lines, including the empty line after a trailing newline.
	pub fn line_count(&self) -> usize {
		crate::rope::visible_line_count(self.text())
	}

	/// Returns true if `other` is a later version of the same document.
	pub fn is_older_than(&self, other: &Snapshot) -> bool {
		self.doc_id() == other.doc_id() && self.version() < other.version()
	}

	/// Returns the composed edits leading from this snapshot to `target`.
	///
	/// Returns `None` for snapshots of other documents and for targets older
	/// than `self`.
	pub fn changes_to(&self, target: &Snapshot) -> Option<ChangeSet> {
		if self.doc_id() != target.doc_id() || target.version() < self.version() {
			return None;
		}
		if target.version() == self.version() {
			return Some(ChangeSet::identity(self.len_chars()));
		}

		let edits = self.inner.history.edits.read();
		let from = usize::try_from(self.version()).ok()?;
		let to = usize::try_from(target.version()).ok()?;
		let mut steps = edits.get(from..to)?.iter().cloned();
		let first = steps.next()?;
		Some(steps.fold(first, ChangeSet::compose))
	}
}

impl PartialEq for Snapshot {
	fn eq(&self, other: &Self) -> bool {
		self.doc_id() == other.doc_id() && self.version() == other.version()
	}
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Snapshot")
			.field("doc_id", &self.doc_id())
			.field("version", &self.version())
			.field("len_chars", &self.len_chars())
			.finish()
	}
}

/// A mutable text buffer that publishes a new [`Snapshot`] per edit.
pub struct Document {
	current: Snapshot,
}

impl Document {
	/// Creates a document at version 0.
	pub fn new(text: impl Into<Rope>) -> Self {
		Self::with_id(DocumentId::next(), text)
	}

	pub fn with_id(doc_id: DocumentId, text: impl Into<Rope>) -> Self {
		Self {
			current: Snapshot {
				inner: Arc::new(SnapshotInner {
					doc_id,
					version: 0,
					text: text.into(),
					history: Arc::new(History::default()),
				}),
			},
		}
	}

	pub fn id(&self) -> DocumentId {
		self.current.doc_id()
	}

	/// Returns the latest snapshot.
	pub fn current(&self) -> Snapshot {
		self.current.clone()
	}

	/// Applies sorted, non-overlapping changes and returns the new snapshot.
	pub fn apply(&mut self, changes: impl IntoIterator<Item = Change>) -> Result<Snapshot, EditError> {
		let cs = ChangeSet::from_changes(self.current.len_chars(), changes)?;
		let mut text = self.current.rope().clone();
		cs.apply(&mut text);

		let history = Arc::clone(&self.current.inner.history);
		history.edits.write().push(cs);

		self.current = Snapshot {
			inner: Arc::new(SnapshotInner {
				doc_id: self.current.doc_id(),
				version: self.current.version() + 1,
				text,
				history,
			}),
		};
		Ok(self.current.clone())
	}

	/// Inserts `text` at `pos`.
	pub fn insert(&mut self, pos: CharIdx, text: &str) -> Result<Snapshot, EditError> {
		self.apply([Change {
			start: pos,
			end: pos,
			replacement: Some(text.into()),
		}])
	}

	/// Deletes `start..end`.
	pub fn delete(&mut self, start: CharIdx, end: CharIdx) -> Result<Snapshot, EditError> {
		self.apply([Change {
			start,
			end,
			replacement: None,
		}])
	}
}
