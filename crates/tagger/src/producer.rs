//! Contract between the tagger and whatever computes tags.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use weft_primitives::{Snapshot, SnapshotLineRange, Span};

/// A tag payload anchored to a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan<T> {
	pub span: Span,
	pub tag: T,
}

impl<T> TagSpan<T> {
	pub fn new(span: Span, tag: T) -> Self {
		Self { span, tag }
	}
}

/// Failure reported by [`TagProducer::tags_in_background`].
///
/// Failed ranges are still marked visited with no tags, so a poison range is
/// never retried for the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProducerError {
	#[error("tag computation cancelled")]
	Cancelled,
	#[error("tag computation failed: {0}")]
	Failed(String),
}

/// Computes tags for a document.
///
/// [`Self::tags_in_background`] runs on a blocking worker thread while every
/// other method is called from the thread that owns the tagger.
pub trait TagProducer: Send + Sync + 'static {
	type Tag: Clone + Send + Sync + 'static;
	/// Per-snapshot state captured once when a background request starts.
	type Data: Send + Sync + 'static;

	/// Answers synchronously when tags are cheap, bypassing all caching.
	fn try_get_tags_prompt(&self, _span: &Span) -> Option<Vec<TagSpan<Self::Tag>>> {
		None
	}

	fn data_for_snapshot(&self, snapshot: &Snapshot) -> Self::Data;

	/// Computes the tags for whole lines of `range`.
	///
	/// Implementations should poll `cancel` and return early once it fires.
	fn tags_in_background(
		&self,
		data: &Self::Data,
		range: &SnapshotLineRange,
		cancel: &CancellationToken,
	) -> Result<Vec<TagSpan<Self::Tag>>, ProducerError>;

	/// Lines currently on screen, computed ahead of any queued work.
	fn visible_line_range(&self) -> Option<SnapshotLineRange> {
		None
	}

	/// Startup delay for new background requests.
	fn delay(&self) -> Option<Duration> {
		None
	}
}
