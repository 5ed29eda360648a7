use crate::document::Snapshot;
use crate::span::Span;
use crate::transaction::{Bias, ChangeSet};

/// Maps spans from one snapshot onto a later snapshot of the same document.
///
/// Composing the edit history is the expensive part of tracking, so callers
/// projecting many spans with a shared origin should build one projection and
/// reuse it.
#[derive(Debug, Clone)]
pub struct Projection {
	from: Snapshot,
	to: Snapshot,
	changes: Option<ChangeSet>,
}

impl Projection {
	/// Returns `None` when `to` is not reachable from `from`.
	pub fn between(from: &Snapshot, to: &Snapshot) -> Option<Self> {
		let changes = if from == to { None } else { Some(from.changes_to(to)?) };
		Some(Self {
			from: from.clone(),
			to: to.clone(),
			changes,
		})
	}

	pub fn from(&self) -> &Snapshot {
		&self.from
	}

	pub fn to(&self) -> &Snapshot {
		&self.to
	}

	/// Projects `span` (which must be on [`Self::from`]) onto [`Self::to`].
	///
	/// The start maps with right bias and the end with left bias, so text
	/// inserted at either edge stays outside. A non-empty span whose text was
	/// deleted fails to project.
	pub fn project(&self, span: &Span) -> Option<Span> {
		if span.snapshot() != &self.from {
			return None;
		}
		let Some(changes) = &self.changes else {
			return Some(Span::new(&self.to, span.start(), span.end()));
		};

		let len = self.to.len_chars();
		if span.is_empty() {
			let pos = changes.map_pos(span.start(), Bias::Right).min(len);
			return Some(Span::point(&self.to, pos));
		}

		let start = changes.map_pos(span.start(), Bias::Right).min(len);
		let end = changes.map_pos(span.end(), Bias::Left).min(len);
		(start < end).then(|| Span::new(&self.to, start, end))
	}
}

/// A span that can be re-resolved against later snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSpan {
	origin: Span,
}

impl TrackingSpan {
	pub fn new(span: Span) -> Self {
		Self { origin: span }
	}

	/// Returns the span as originally recorded.
	pub fn origin(&self) -> &Span {
		&self.origin
	}

	/// Resolves this span on `snapshot`.
	///
	/// Returns the original span on its own snapshot; otherwise projects it
	/// forward, failing for other documents, older snapshots, or deleted text.
	pub fn span_on(&self, snapshot: &Snapshot) -> Option<Span> {
		if self.origin.snapshot() == snapshot {
			return Some(self.origin.clone());
		}
		Projection::between(self.origin.snapshot(), snapshot)?.project(&self.origin)
	}

	/// Resolves through a prepared projection, falling back to [`Self::span_on`]
	/// when the projection starts from a different snapshot.
	pub fn span_via(&self, projection: &Projection) -> Option<Span> {
		if self.origin.snapshot() == projection.from() {
			projection.project(&self.origin)
		} else {
			self.span_on(projection.to())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::Document;

	#[test]
	fn test_span_on_same_snapshot_is_identity() {
		let doc = Document::new("hello world");
		let s = doc.current();
		let tracked = TrackingSpan::new(Span::new(&s, 6, 11));
		assert_eq!(tracked.span_on(&s), Some(Span::new(&s, 6, 11)));
	}

	#[test]
	fn test_span_shifts_after_insert_before() {
		let mut doc = Document::new("hello world");
		let v0 = doc.current();
		let tracked = TrackingSpan::new(Span::new(&v0, 6, 11));
		let v1 = doc.insert(0, ">> ").unwrap();
		assert_eq!(tracked.span_on(&v1).map(|s| s.bounds()), Some((9, 14)));
	}

	#[test]
	fn test_edge_insertions_stay_outside() {
		let mut doc = Document::new("abcdef");
		let v0 = doc.current();
		let tracked = TrackingSpan::new(Span::new(&v0, 2, 4));
		doc.insert(4, "XX").unwrap();
		let v2 = doc.insert(2, "YY").unwrap();
		assert_eq!(v2.text().to_string(), "abYYcdXXef");
		assert_eq!(tracked.span_on(&v2).map(|s| s.bounds()), Some((4, 6)));
	}

	#[test]
	fn test_deleted_span_fails_to_project() {
		let mut doc = Document::new("keep drop keep");
		let v0 = doc.current();
		let tracked = TrackingSpan::new(Span::new(&v0, 5, 9));
		let v1 = doc.delete(4, 10).unwrap();
		assert_eq!(tracked.span_on(&v1), None);
	}

	#[test]
	fn test_older_snapshot_fails() {
		let mut doc = Document::new("abc");
		let v0 = doc.current();
		let v1 = doc.insert(0, "x").unwrap();
		let tracked = TrackingSpan::new(Span::new(&v1, 0, 2));
		assert_eq!(tracked.span_on(&v0), None);
	}

	#[test]
	fn test_projection_reused_across_spans() {
		let mut doc = Document::new("one\ntwo\nthree\n");
		let v0 = doc.current();
		let v1 = doc.insert(0, "zero\n").unwrap();
		let projection = Projection::between(&v0, &v1).unwrap();
		let spans: Vec<_> = [(0, 3), (4, 7), (8, 13)]
			.into_iter()
			.map(|(s, e)| TrackingSpan::new(Span::new(&v0, s, e)).span_via(&projection).unwrap().bounds())
			.collect();
		assert_eq!(spans, vec![(5, 8), (9, 12), (13, 18)]);
	}
}
