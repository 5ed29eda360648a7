//! Normalized set of line ranges already computed for one snapshot.

use smallvec::SmallVec;
use weft_primitives::LineRange;

/// Sorted, disjoint, non-adjacent line intervals.
///
/// Touching ranges are merged on insert, so `[0,5)` then `[5,10)` is stored as
/// a single `[0,10)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedRangeSet {
	ranges: SmallVec<[LineRange; 4]>,
}

impl VisitedRangeSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	/// Returns the normalized intervals in line order.
	pub fn ranges(&self) -> &[LineRange] {
		&self.ranges
	}

	/// Marks `range` as visited.
	pub fn add(&mut self, range: LineRange) {
		let first = self.ranges.partition_point(|r| r.end() < range.start());
		let mut merged = range;
		let mut last = first;
		while last < self.ranges.len() && self.ranges[last].touches(&merged) {
			merged = merged.union(&self.ranges[last]);
			last += 1;
		}
		self.ranges.drain(first..last);
		self.ranges.insert(first, merged);
	}

	/// Returns the tightest single range covering every unvisited line in `range`.
	///
	/// Visited pockets between two gaps are included in the result, so callers
	/// may recompute a few lines but never skip an unvisited one.
	pub fn unvisited(&self, range: LineRange) -> Option<LineRange> {
		let gaps = self.unvisited_ranges(range);
		let first = gaps.first()?;
		let last = gaps.last()?;
		Some(LineRange::from_bounds(first.start(), last.last_line()))
	}

	/// Returns each unvisited gap in `range` precisely.
	pub fn unvisited_ranges(&self, range: LineRange) -> Vec<LineRange> {
		let mut gaps = Vec::new();
		let mut cursor = range.start();
		for visited in self.ranges.iter().filter(|r| r.intersects(&range)) {
			if visited.start() > cursor {
				gaps.push(LineRange::new(cursor, visited.start() - cursor));
			}
			cursor = cursor.max(visited.end());
		}
		if cursor < range.end() {
			gaps.push(LineRange::new(cursor, range.end() - cursor));
		}
		gaps
	}

	/// Returns true when every line of `range` has been visited.
	pub fn contains(&self, range: LineRange) -> bool {
		self.unvisited(range).is_none()
	}

	/// Returns the bounding range of everything visited.
	pub fn overarching(&self) -> Option<LineRange> {
		let first = self.ranges.first()?;
		let last = self.ranges.last()?;
		Some(LineRange::from_bounds(first.start(), last.last_line()))
	}
}
