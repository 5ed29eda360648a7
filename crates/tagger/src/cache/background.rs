use weft_primitives::{LineRange, Snapshot, SnapshotLineRange, Span, TrackingSpan};

use super::{CacheState, TrackingCache};
use crate::producer::TagSpan;
use crate::visited::VisitedRangeSet;

/// Accumulated background results for one snapshot.
#[derive(Debug, Clone)]
pub struct BackgroundCache<T> {
	snapshot: Snapshot,
	visited: VisitedRangeSet,
	tags: Vec<TagSpan<T>>,
}

impl<T: Clone> BackgroundCache<T> {
	/// Starts a cache from the first computed range.
	pub fn new(range: &SnapshotLineRange, tags: Vec<TagSpan<T>>) -> Self {
		let mut visited = VisitedRangeSet::new();
		visited.add(range.range());
		Self::from_parts(range.snapshot().clone(), visited, tags)
	}

	pub fn from_parts(snapshot: Snapshot, visited: VisitedRangeSet, tags: Vec<TagSpan<T>>) -> Self {
		Self { snapshot, visited, tags }
	}

	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	pub fn visited(&self) -> &VisitedRangeSet {
		&self.visited
	}

	pub fn tags(&self) -> &[TagSpan<T>] {
		&self.tags
	}

	/// Records tags computed for `range` on this cache's snapshot.
	///
	/// Tags previously stored for lines of `range` are replaced.
	pub fn add(&mut self, range: LineRange, tags: impl IntoIterator<Item = TagSpan<T>>) {
		if self.visited.overarching().is_some_and(|o| o.intersects(&range)) {
			let rope = self.snapshot.rope();
			self.tags.retain(|t| !range.contains_line(rope.char_to_line(t.span.start())));
		}
		self.visited.add(range);
		self.tags.extend(tags);
	}

	/// Returns true when the line holding `pos` has been computed.
	pub(crate) fn covers_char(&self, pos: usize) -> bool {
		let line = self.snapshot.rope().char_to_line(pos);
		self.visited.contains(LineRange::line(line))
	}

	/// Classifies how much of `span` is answerable from this cache.
	///
	/// Spans on other snapshots are never answerable.
	pub fn state(&self, span: &Span) -> CacheState {
		if span.snapshot() != &self.snapshot {
			return CacheState::None;
		}
		let Some(overarching) = self.visited.overarching() else {
			return CacheState::None;
		};
		let lines = SnapshotLineRange::for_span(span).range();
		if !overarching.intersects(&lines) {
			CacheState::None
		} else if self.visited.contains(lines) {
			CacheState::Complete
		} else {
			CacheState::Partial
		}
	}

	/// Returns cached tags that intersect `span`.
	pub fn tags_intersecting<'a>(&'a self, span: &'a Span) -> impl Iterator<Item = &'a TagSpan<T>> + 'a {
		self.tags.iter().filter(move |t| t.span.intersects(span))
	}

	/// Converts every tag into a forward-trackable entry anchored on the cached extent.
	pub fn to_tracking_cache(&self) -> TrackingCache<T> {
		let extent = self
			.visited
			.overarching()
			.and_then(|lines| SnapshotLineRange::new(&self.snapshot, lines))
			.map(|lines| lines.extent())
			.unwrap_or_else(|| Span::point(&self.snapshot, 0));
		TrackingCache::new(
			TrackingSpan::new(extent),
			self.tags.iter().map(|t| (TrackingSpan::new(t.span.clone()), t.tag.clone())),
		)
	}
}
