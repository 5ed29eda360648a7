use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};
use weft_primitives::{LineRange, Snapshot, SnapshotLineRange, Span, TrackingSpan};
use weft_worker::GenerationToken;

use super::AsyncTagger;
use crate::cache::BackgroundCache;
use crate::channel::PriorityChannel;
use crate::msg::CompletionReason;
use crate::producer::{TagProducer, TagSpan};
use crate::request::{BackgroundRequest, RequestStart};

impl<P: TagProducer> AsyncTagger<P> {
	/// Queues the lines of `span` for background computation.
	///
	/// Reuses the active request when it targets the same snapshot; otherwise
	/// starts a fresh one.
	pub(super) fn enqueue(&mut self, span: &Span) {
		let snapshot = span.snapshot();
		self.reconcile(snapshot);
		let lines = SnapshotLineRange::for_span(span);

		if let Some(request) = &self.request
			&& request.snapshot() == snapshot
		{
			request.channel().write_normal(lines.range());
			trace!(
				generation = request.generation(),
				start = lines.start_line(),
				count = lines.count(),
				"tagger.request.push"
			);
			return;
		}

		self.cancel_request();
		self.start_request(lines);
	}

	fn start_request(&mut self, lines: SnapshotLineRange) {
		let snapshot = lines.snapshot().clone();
		let data = self.producer.data_for_snapshot(&snapshot);

		let channel = Arc::new(PriorityChannel::new());
		channel.write_normal(lines.range());
		if let Some(visible) = self.visible_lines_on(&snapshot) {
			channel.write_visible(visible);
		}

		let visited = self
			.background
			.as_ref()
			.filter(|bg| bg.snapshot() == &snapshot)
			.map(|bg| bg.visited().clone())
			.unwrap_or_default();
		let generation = self.clock.next();
		let delay = self.cfg.delay.or_else(|| self.producer.delay());

		debug!(
			generation,
			version = snapshot.version(),
			start = lines.start_line(),
			count = lines.count(),
			?delay,
			"tagger.request.start"
		);
		self.metrics.requests_started += 1;
		self.request = Some(BackgroundRequest::start(RequestStart {
			producer: Arc::clone(&self.producer),
			data,
			snapshot,
			channel,
			visited,
			token: GenerationToken::new(generation),
			chunk_size: self.cfg.chunk_size,
			delay,
			tx: self.tx.clone(),
		}));
	}

	/// Cancels the active request, if any. Its later messages are dropped as stale.
	pub(super) fn cancel_request(&mut self) {
		if let Some(request) = self.request.take() {
			request.cancel();
			self.metrics.requests_cancelled += 1;
			debug!(generation = request.generation(), "tagger.request.cancel");
		}
	}

	/// Returns the producer's visible lines, projected onto `snapshot` when needed.
	fn visible_lines_on(&self, snapshot: &Snapshot) -> Option<LineRange> {
		let visible = self.producer.visible_line_range()?;
		if visible.snapshot() == snapshot {
			return Some(visible.range());
		}
		let projected = TrackingSpan::new(visible.extent()).span_on(snapshot)?;
		Some(SnapshotLineRange::for_span(&projected).range())
	}

	pub(super) fn on_progress(&mut self, generation: u64, range: SnapshotLineRange, tags: Vec<TagSpan<P::Tag>>, failed: bool) {
		if !self.is_current(generation) {
			self.metrics.stale_messages += 1;
			trace!(generation, "tagger.progress.stale");
			return;
		}
		self.metrics.chunks_computed += 1;
		if failed {
			self.metrics.producer_failures += 1;
		}

		self.reconcile(range.snapshot());
		let extent = range.extent();
		let changed = self.differs_from_tracking(&extent, &tags);
		debug!(
			generation,
			start = range.start_line(),
			count = range.count(),
			tags = tags.len(),
			changed,
			"tagger.progress"
		);

		if let Some(background) = self.background.as_mut() {
			background.add(range.range(), tags);
		} else {
			self.background = Some(BackgroundCache::new(&range, tags));
		}

		if changed {
			self.raise(extent);
		} else {
			self.metrics.notifications_suppressed += 1;
		}
	}

	/// Compares fresh tags with what the tracking cache served over `extent`.
	///
	/// Only spans are compared; payloads are ignored.
	fn differs_from_tracking(&self, extent: &Span, fresh: &[TagSpan<P::Tag>]) -> bool {
		let served: Vec<_> = match &self.tracking {
			Some(tracking) if tracking.contains_cached_tags(extent) => tracking
				.cached_tags(extent.snapshot())
				.into_iter()
				.filter(|t| t.span.intersects(extent))
				.map(|t| t.span.bounds())
				.collect(),
			_ => Vec::new(),
		};
		if served.len() != fresh.len() {
			return true;
		}
		let served: HashSet<_> = served.into_iter().collect();
		fresh.iter().any(|t| !served.contains(&t.span.bounds()))
	}

	pub(super) fn on_complete(&mut self, generation: u64, reason: CompletionReason) {
		if !self.is_current(generation) {
			self.metrics.stale_messages += 1;
			trace!(generation, "tagger.complete.stale");
			return;
		}
		let Some(request) = self.request.take() else {
			return;
		};
		self.tracking = None;
		debug!(generation, reason = reason.as_str(), "tagger.request.complete");

		if reason != CompletionReason::Finished {
			return;
		}

		// Writes that raced the worker's exit; restart rather than lose them.
		let snapshot = request.snapshot().clone();
		let channel = request.channel();
		let pending: Vec<LineRange> = channel.current_visible().into_iter().chain(channel.current_stack()).collect();
		drop(request);
		for range in pending.into_iter().rev() {
			if let Some(lines) = SnapshotLineRange::new(&snapshot, range) {
				self.enqueue(&lines.extent());
			}
		}
	}

	pub(super) fn on_producer_changed(&mut self) {
		self.background = None;
		self.tracking = None;
		self.cancel_request();
		debug!(requested = self.requested.is_some(), "tagger.producer.changed");
		if let Some(span) = self.requested.clone() {
			self.raise(span);
		}
	}

	pub(super) fn on_viewport_changed(&mut self) {
		let Some(request) = &self.request else {
			return;
		};
		let Some(visible) = self.visible_lines_on(request.snapshot()) else {
			return;
		};
		request.channel().write_visible(visible);
		trace!(
			generation = request.generation(),
			start = visible.start(),
			count = visible.count(),
			"tagger.viewport"
		);
	}
}
