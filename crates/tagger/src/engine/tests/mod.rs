mod runtime;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use weft_primitives::{Document, LineRange, Snapshot, SnapshotLineRange, Span};

use super::AsyncTagger;
use crate::config::TaggerCfg;
use crate::msg::CompletionReason;
use crate::producer::{ProducerError, TagProducer, TagSpan};

/// Tags every non-empty line with its line number.
#[derive(Default)]
pub(super) struct LineProducer {
	/// `(snapshot version, lines)` per background call.
	pub calls: Mutex<Vec<(u64, LineRange)>>,
	pub data_calls: AtomicUsize,
	pub prompt: bool,
	pub fail_line: Option<usize>,
	pub panic_line: Option<usize>,
	pub visible: Mutex<Option<SnapshotLineRange>>,
	pub delay: Option<Duration>,
}

impl LineProducer {
	pub fn ranges(&self) -> Vec<LineRange> {
		self.calls.lock().iter().map(|(_, r)| *r).collect()
	}
}

impl TagProducer for LineProducer {
	type Tag = usize;
	type Data = Snapshot;

	fn try_get_tags_prompt(&self, span: &Span) -> Option<Vec<TagSpan<usize>>> {
		self.prompt
			.then(|| line_tags(span.snapshot(), SnapshotLineRange::for_span(span).range()))
	}

	fn data_for_snapshot(&self, snapshot: &Snapshot) -> Snapshot {
		self.data_calls.fetch_add(1, Ordering::Relaxed);
		snapshot.clone()
	}

	fn tags_in_background(
		&self,
		data: &Snapshot,
		range: &SnapshotLineRange,
		_cancel: &CancellationToken,
	) -> Result<Vec<TagSpan<usize>>, ProducerError> {
		self.calls.lock().push((data.version(), range.range()));
		if self.panic_line.is_some_and(|l| range.range().contains_line(l)) {
			panic!("line producer poisoned");
		}
		if self.fail_line.is_some_and(|l| range.range().contains_line(l)) {
			return Err(ProducerError::Failed(format!("cannot tag line {}", range.start_line())));
		}
		Ok(line_tags(data, range.range()))
	}

	fn visible_line_range(&self) -> Option<SnapshotLineRange> {
		self.visible.lock().clone()
	}

	fn delay(&self) -> Option<Duration> {
		self.delay
	}
}

pub(super) fn numbered_doc(lines: usize) -> Document {
	let text: String = (0..lines).map(|i| format!("line {i}\n")).collect();
	Document::new(text.as_str())
}

/// Span from the start of `start` to the start of `end`.
pub(super) fn lines_span(snapshot: &Snapshot, start: usize, end: usize) -> Span {
	let rope = snapshot.rope();
	Span::new(snapshot, rope.line_to_char(start), rope.line_to_char(end))
}

pub(super) fn line_tags(snapshot: &Snapshot, range: LineRange) -> Vec<TagSpan<usize>> {
	let rope = snapshot.rope();
	(range.start()..range.end())
		.filter(|&line| line < rope.len_lines())
		.filter_map(|line| {
			let start = rope.line_to_char(line);
			let len = rope.line(line).len_chars().saturating_sub(1);
			(len > 0).then(|| TagSpan::new(Span::new(snapshot, start, start + len), line))
		})
		.collect()
}

/// Workers sleep long enough that tests drive progress by hand.
pub(super) fn parked_cfg() -> TaggerCfg {
	TaggerCfg {
		chunk_size: 500,
		delay: Some(Duration::from_secs(3600)),
	}
}

pub(super) fn parked_tagger(producer: &Arc<LineProducer>) -> AsyncTagger<LineProducer> {
	AsyncTagger::with_cfg(Arc::clone(producer), parked_cfg())
}

impl AsyncTagger<LineProducer> {
	pub(super) fn active_generation(&self) -> Option<u64> {
		self.request.as_ref().map(|r| r.generation())
	}

	/// Plays the worker's part: takes everything queued on the channel.
	pub(super) fn take_pending(&self) -> Vec<LineRange> {
		let mut taken = Vec::new();
		if let Some(request) = &self.request {
			while let Some(range) = request.channel().read() {
				taken.push(range);
			}
		}
		taken
	}

	/// Feeds computed line tags for `ranges` and completes the active request.
	pub(super) fn finish_by_hand(&mut self, snapshot: &Snapshot, ranges: &[LineRange]) {
		let generation = self.active_generation().expect("no active request");
		self.take_pending();
		for &range in ranges {
			let lines = SnapshotLineRange::new(snapshot, range).expect("range past end");
			self.on_progress(generation, lines, line_tags(snapshot, range), false);
		}
		self.on_complete(generation, CompletionReason::Finished);
	}
}
