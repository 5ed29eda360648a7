use std::collections::HashSet;

use weft_primitives::{Projection, Snapshot, Span, TrackingSpan};

use crate::producer::TagSpan;

/// Tags from older snapshots, re-resolved on demand against newer ones.
///
/// Resolution is lossy: entries whose text was deleted stop resolving and are
/// silently dropped.
#[derive(Debug, Clone)]
pub struct TrackingCache<T> {
	anchor: TrackingSpan,
	entries: Vec<(TrackingSpan, T)>,
}

impl<T: Clone> TrackingCache<T> {
	pub fn new(anchor: TrackingSpan, entries: impl IntoIterator<Item = (TrackingSpan, T)>) -> Self {
		Self {
			anchor,
			entries: entries.into_iter().collect(),
		}
	}

	pub fn anchor(&self) -> &TrackingSpan {
		&self.anchor
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Combines two caches onto `target`.
	///
	/// The anchor becomes the union of whichever anchors still resolve, or an
	/// empty span at the start when neither does. Entries resolving to the same
	/// span on `target` are kept once, preferring `self`.
	pub fn merge(&self, target: &Snapshot, other: &TrackingCache<T>) -> TrackingCache<T> {
		let extent = match (self.anchor.span_on(target), other.anchor.span_on(target)) {
			(Some(a), Some(b)) => a.union(&b).unwrap_or(a),
			(Some(a), None) => a,
			(None, Some(b)) => b,
			(None, None) => Span::point(target, 0),
		};

		let mut seen = HashSet::new();
		let entries = self
			.resolve(target)
			.into_iter()
			.chain(other.resolve(target))
			.filter(|t| seen.insert(t.span.bounds()))
			.map(|t| (TrackingSpan::new(t.span), t.tag))
			.collect::<Vec<_>>();

		TrackingCache {
			anchor: TrackingSpan::new(extent),
			entries,
		}
	}

	/// Returns true while the cached extent still resolves on `span`'s snapshot.
	pub fn contains_cached_tags(&self, span: &Span) -> bool {
		self.anchor.span_on(span.snapshot()).is_some()
	}

	/// Resolves every entry on `snapshot`, dropping those that no longer map.
	pub fn cached_tags(&self, snapshot: &Snapshot) -> Vec<TagSpan<T>> {
		self.resolve(snapshot)
	}

	fn resolve(&self, snapshot: &Snapshot) -> Vec<TagSpan<T>> {
		// One projection per origin snapshot; `None` marks an unreachable origin.
		let mut projections: Vec<(Snapshot, Option<Projection>)> = Vec::new();
		let mut out = Vec::with_capacity(self.entries.len());
		for (span, tag) in &self.entries {
			let origin = span.origin().snapshot();
			let idx = match projections.iter().position(|(from, _)| from == origin) {
				Some(idx) => idx,
				None => {
					projections.push((origin.clone(), Projection::between(origin, snapshot)));
					projections.len() - 1
				}
			};
			let resolved = projections[idx].1.as_ref().and_then(|p| span.span_via(p));
			if let Some(resolved) = resolved {
				out.push(TagSpan::new(resolved, tag.clone()));
			}
		}
		out
	}
}
