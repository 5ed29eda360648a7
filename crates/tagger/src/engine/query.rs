use weft_primitives::{Span, TrackingSpan};

use super::AsyncTagger;
use crate::cache::CacheState;
use crate::producer::{TagProducer, TagSpan};

impl<P: TagProducer> AsyncTagger<P> {
	/// Returns the best tags available right now for `spans`.
	///
	/// Never blocks. Lines the background cache cannot fully answer are queued
	/// for computation, and the caller hears about the results through
	/// [`Self::subscribe`]. Only tags intersecting a requested span are returned.
	pub fn query(&mut self, spans: &[Span]) -> Vec<TagSpan<P::Tag>> {
		let mut out = Vec::new();
		let Some(first) = spans.first() else {
			return out;
		};

		if self.is_disposed() {
			for span in spans {
				if let Some(tags) = self.producer.try_get_tags_prompt(span) {
					extend_intersecting(&mut out, tags, span);
				}
			}
			return out;
		}

		self.widen_requested(spans);
		self.reconcile(first.snapshot());
		for span in spans {
			self.query_span(span, &mut out);
		}
		out
	}

	fn query_span(&mut self, span: &Span, out: &mut Vec<TagSpan<P::Tag>>) {
		if let Some(tags) = self.producer.try_get_tags_prompt(span) {
			extend_intersecting(out, tags, span);
			return;
		}

		self.reconcile(span.snapshot());
		let state = self.cache_state(span);
		if state != CacheState::None
			&& let Some(background) = &self.background
		{
			out.extend(background.tags_intersecting(span).cloned());
		}
		if state == CacheState::Complete {
			return;
		}

		self.enqueue(span);
		if let Some(tracking) = &self.tracking
			&& tracking.contains_cached_tags(span)
		{
			let mut tracked = tracking.cached_tags(span.snapshot());
			// Recomputed lines are served from the background cache only.
			if let Some(background) = &self.background
				&& background.snapshot() == span.snapshot()
			{
				tracked.retain(|t| !background.covers_char(t.span.start()));
			}
			extend_intersecting(out, tracked, span);
		}
	}

	/// Grows the overarching requested span.
	///
	/// A span on a new snapshot restarts the union from the old one projected
	/// forward, or from scratch when that projection fails.
	fn widen_requested(&mut self, spans: &[Span]) {
		for span in spans {
			let widened = match self.requested.take() {
				Some(prev) if prev.snapshot() == span.snapshot() => prev.union(span),
				Some(prev) => TrackingSpan::new(prev).span_on(span.snapshot()).and_then(|p| p.union(span)),
				None => None,
			};
			self.requested = Some(widened.unwrap_or_else(|| span.clone()));
		}
	}
}

fn extend_intersecting<T>(out: &mut Vec<TagSpan<T>>, tags: Vec<TagSpan<T>>, span: &Span) {
	out.extend(tags.into_iter().filter(|t| t.span.intersects(span)));
}
