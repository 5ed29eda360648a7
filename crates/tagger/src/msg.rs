//! Messages marshaled onto the thread that owns an [`crate::AsyncTagger`].

use tokio::sync::mpsc;
use weft_primitives::{SnapshotLineRange, Span};

use crate::producer::TagSpan;

/// Why a background worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
	Finished,
	Cancelled,
}

impl CompletionReason {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Finished => "finished",
			Self::Cancelled => "cancelled",
		}
	}
}

#[derive(Debug)]
pub(crate) enum TaggerMsg<T> {
	Progress {
		generation: u64,
		range: SnapshotLineRange,
		tags: Vec<TagSpan<T>>,
		failed: bool,
	},
	Completed {
		generation: u64,
		reason: CompletionReason,
	},
	ProducerChanged,
	ViewportChanged,
}

/// Emitted when newly computed tags differ from what was served over `span`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsChanged {
	pub span: Span,
}

/// Cross-thread handle for raising producer and viewport signals.
///
/// Sends fail silently once the tagger is disposed.
pub struct TaggerNotifier<T> {
	tx: mpsc::UnboundedSender<TaggerMsg<T>>,
}

impl<T> Clone for TaggerNotifier<T> {
	fn clone(&self) -> Self {
		Self { tx: self.tx.clone() }
	}
}

impl<T> std::fmt::Debug for TaggerNotifier<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TaggerNotifier").field("closed", &self.tx.is_closed()).finish()
	}
}

impl<T> TaggerNotifier<T> {
	pub(crate) fn new(tx: mpsc::UnboundedSender<TaggerMsg<T>>) -> Self {
		Self { tx }
	}

	/// Signals that previously produced tags are no longer valid.
	///
	/// Returns false if the tagger is gone.
	pub fn producer_changed(&self) -> bool {
		self.tx.send(TaggerMsg::ProducerChanged).is_ok()
	}

	/// Signals that the producer's visible line range moved.
	pub fn viewport_changed(&self) -> bool {
		self.tx.send(TaggerMsg::ViewportChanged).is_ok()
	}
}
