use crate::document::Snapshot;
use crate::range::{CharIdx, CharLen, LineRange};
use crate::rope::{line_end_including_break, line_of, line_start};

/// A half-open char interval `[start, end)` on one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
	snapshot: Snapshot,
	start: CharIdx,
	end: CharIdx,
}

impl Span {
	/// Creates a span, clamping both ends to the snapshot and ordering them.
	pub fn new(snapshot: &Snapshot, start: CharIdx, end: CharIdx) -> Self {
		let len = snapshot.len_chars();
		let (start, end) = (start.min(end).min(len), end.max(start).min(len));
		Self {
			snapshot: snapshot.clone(),
			start,
			end,
		}
	}

	/// Creates an empty span at `pos`.
	pub fn point(snapshot: &Snapshot, pos: CharIdx) -> Self {
		Self::new(snapshot, pos, pos)
	}

	/// Creates a span covering the whole snapshot.
	pub fn whole(snapshot: &Snapshot) -> Self {
		Self::new(snapshot, 0, snapshot.len_chars())
	}

	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	#[inline]
	pub fn start(&self) -> CharIdx {
		self.start
	}

	#[inline]
	pub fn end(&self) -> CharIdx {
		self.end
	}

	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns the `(start, end)` pair, ignoring the snapshot.
	#[inline]
	pub fn bounds(&self) -> (CharIdx, CharIdx) {
		(self.start, self.end)
	}

	/// Returns true if both spans are on the same snapshot and overlap.
	///
	/// An empty span intersects any span that contains its position,
	/// including that span's end.
	pub fn intersects(&self, other: &Span) -> bool {
		if self.snapshot != other.snapshot {
			return false;
		}
		let start = self.start.max(other.start);
		let end = self.end.min(other.end);
		start < end || (start == end && (self.is_empty() || other.is_empty()))
	}

	/// Returns the shared region of two intersecting spans.
	pub fn overlap(&self, other: &Span) -> Option<Span> {
		self.intersects(other)
			.then(|| Span::new(&self.snapshot, self.start.max(other.start), self.end.min(other.end)))
	}

	/// Returns the smallest span covering both, if they share a snapshot.
	pub fn union(&self, other: &Span) -> Option<Span> {
		(self.snapshot == other.snapshot).then(|| Span::new(&self.snapshot, self.start.min(other.start), self.end.max(other.end)))
	}
}

/// A [`LineRange`] anchored to a snapshot.
///
/// Construction clamps the range to the snapshot's lines, so the range always
/// names lines that exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLineRange {
	snapshot: Snapshot,
	range: LineRange,
}

impl SnapshotLineRange {
	/// Anchors `range` to `snapshot`, trimming lines past the end.
	///
	/// Returns `None` when the range starts past the last line.
	pub fn new(snapshot: &Snapshot, range: LineRange) -> Option<Self> {
		let line_count = snapshot.line_count();
		if range.start() >= line_count {
			return None;
		}
		let last = range.last_line().min(line_count - 1);
		Some(Self {
			snapshot: snapshot.clone(),
			range: LineRange::from_bounds(range.start(), last),
		})
	}

	/// Expands a char span to the whole lines it touches.
	///
	/// A non-empty span ending exactly at a line start does not pull in that line.
	pub fn for_span(span: &Span) -> Self {
		let text = span.snapshot().text();
		let start = line_of(text, span.start());
		let last = if span.is_empty() { start } else { line_of(text, span.end() - 1).max(start) };
		Self {
			snapshot: span.snapshot().clone(),
			range: LineRange::from_bounds(start, last),
		}
	}

	/// Covers every line of `snapshot`.
	pub fn for_whole_snapshot(snapshot: &Snapshot) -> Self {
		Self {
			snapshot: snapshot.clone(),
			range: LineRange::new(0, snapshot.line_count()),
		}
	}

	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	pub fn range(&self) -> LineRange {
		self.range
	}

	pub fn start_line(&self) -> usize {
		self.range.start()
	}

	pub fn last_line(&self) -> usize {
		self.range.last_line()
	}

	pub fn count(&self) -> usize {
		self.range.count()
	}

	/// Returns the char span covering every line, including the last line break.
	pub fn extent(&self) -> Span {
		let text = self.snapshot.text();
		Span::new(
			&self.snapshot,
			line_start(text, self.range.start()),
			line_end_including_break(text, self.range.last_line()),
		)
	}
}
