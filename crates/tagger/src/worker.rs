//! Background computation loop for one request.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};
use weft_primitives::{LineRange, Snapshot, SnapshotLineRange};
use weft_worker::panic_message;

use crate::channel::PriorityChannel;
use crate::msg::CompletionReason;
use crate::producer::{ProducerError, TagProducer, TagSpan};
use crate::visited::VisitedRangeSet;

/// Borrowed inputs for [`run_in_background`].
pub(crate) struct BackgroundWork<'a, P: TagProducer> {
	pub producer: &'a P,
	pub data: &'a P::Data,
	pub snapshot: &'a Snapshot,
	pub channel: &'a PriorityChannel,
	pub cancel: &'a CancellationToken,
	pub chunk_size: usize,
}

/// Result of one producer call.
#[derive(Debug)]
pub(crate) struct ChunkResult<T> {
	pub range: SnapshotLineRange,
	pub tags: Vec<TagSpan<T>>,
	pub failed: bool,
}

/// Drains `work.channel` in chunks until it is empty or cancellation fires.
///
/// Ranges pulled from the channel are split into chunks and queued ahead of
/// older chunks, and the local queue is abandoned for a fresh channel read
/// whenever the channel version moves. Each chunk calls the producer once per
/// unvisited gap, so visited lines are never computed twice. Every computed
/// gap is marked in `visited` and handed to `report`.
pub(crate) fn run_in_background<P: TagProducer>(
	work: BackgroundWork<'_, P>,
	visited: &mut VisitedRangeSet,
	mut report: impl FnMut(ChunkResult<P::Tag>),
) -> CompletionReason {
	let mut queue: VecDeque<LineRange> = VecDeque::new();

	loop {
		if work.cancel.is_cancelled() {
			return CompletionReason::Cancelled;
		}

		let version = work.channel.current_version();
		match work.channel.read() {
			Some(range) => {
				let chunks: Vec<_> = range.chunks(work.chunk_size).collect();
				for chunk in chunks.into_iter().rev() {
					queue.push_front(chunk);
				}
			}
			None if queue.is_empty() => return CompletionReason::Finished,
			None => {}
		}

		while work.channel.current_version() == version {
			if work.cancel.is_cancelled() {
				return CompletionReason::Cancelled;
			}
			let Some(chunk) = queue.pop_front() else {
				break;
			};
			let Some(lines) = SnapshotLineRange::new(work.snapshot, chunk) else {
				continue;
			};
			for gap in visited.unvisited_ranges(lines.range()) {
				let Some(target) = SnapshotLineRange::new(work.snapshot, gap) else {
					continue;
				};

				trace!(start = target.start_line(), count = target.count(), "tagger.worker.chunk");
				let Some((tags, failed)) = compute(&work, &target) else {
					return CompletionReason::Cancelled;
				};
				if work.cancel.is_cancelled() {
					return CompletionReason::Cancelled;
				}

				visited.add(target.range());
				report(ChunkResult { range: target, tags, failed });
			}
		}
	}
}

/// Calls the producer, degrading errors and panics to an empty result.
///
/// Returns `None` when the producer stopped because of cancellation.
fn compute<P: TagProducer>(work: &BackgroundWork<'_, P>, range: &SnapshotLineRange) -> Option<(Vec<TagSpan<P::Tag>>, bool)> {
	let outcome = catch_unwind(AssertUnwindSafe(|| work.producer.tags_in_background(work.data, range, work.cancel)));
	match outcome {
		Ok(Ok(tags)) => Some((tags, false)),
		Ok(Err(ProducerError::Cancelled)) if work.cancel.is_cancelled() => None,
		Ok(Err(error)) => {
			warn!(
				start = range.start_line(),
				count = range.count(),
				error = %error,
				"tagger.producer.failed"
			);
			Some((Vec::new(), true))
		}
		Err(payload) => {
			let panic = panic_message(payload.as_ref()).unwrap_or_else(|| "non-string panic payload".to_string());
			warn!(
				start = range.start_line(),
				count = range.count(),
				panic = %panic,
				"tagger.producer.failed"
			);
			Some((Vec::new(), true))
		}
	}
}
