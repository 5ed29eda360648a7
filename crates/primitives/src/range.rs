/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for spans and edits.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A contiguous, non-empty run of lines.
///
/// Lines are zero-based. The range always covers at least one line; the last
/// covered line is inclusive ([`Self::last_line`]) while [`Self::end`] is the
/// exclusive bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
	start: usize,
	count: usize,
}

impl LineRange {
	/// Creates a range of `count` lines starting at `start`.
	///
	/// A zero count is widened to one line.
	pub fn new(start: usize, count: usize) -> Self {
		debug_assert!(count > 0, "LineRange must cover at least one line");
		Self { start, count: count.max(1) }
	}

	/// Creates a range from an inclusive `start..=last` pair.
	pub fn from_bounds(start: usize, last: usize) -> Self {
		debug_assert!(start <= last, "LineRange bounds out of order: {start} > {last}");
		let last = last.max(start);
		Self {
			start,
			count: last - start + 1,
		}
	}

	/// Creates a single-line range.
	pub fn line(line: usize) -> Self {
		Self { start: line, count: 1 }
	}

	/// Returns the first line.
	#[inline]
	pub const fn start(&self) -> usize {
		self.start
	}

	/// Returns the number of lines covered.
	#[inline]
	pub const fn count(&self) -> usize {
		self.count
	}

	/// Returns the last covered line (inclusive).
	#[inline]
	pub const fn last_line(&self) -> usize {
		self.start + self.count - 1
	}

	/// Returns the exclusive end line.
	#[inline]
	pub const fn end(&self) -> usize {
		self.start + self.count
	}

	pub fn contains_line(&self, line: usize) -> bool {
		line >= self.start && line < self.end()
	}

	/// Returns true if `other` lies entirely inside this range.
	pub fn contains(&self, other: &LineRange) -> bool {
		other.start >= self.start && other.end() <= self.end()
	}

	/// Returns true if the two ranges share at least one line.
	pub fn intersects(&self, other: &LineRange) -> bool {
		self.start < other.end() && other.start < self.end()
	}

	/// Returns true if the ranges share a line or touch end to start.
	pub fn touches(&self, other: &LineRange) -> bool {
		self.start <= other.end() && other.start <= self.end()
	}

	/// Returns the smallest range covering both.
	pub fn union(&self, other: &LineRange) -> LineRange {
		let start = self.start.min(other.start);
		let end = self.end().max(other.end());
		LineRange::new(start, end - start)
	}

	/// Returns the shared lines, if any.
	pub fn intersection(&self, other: &LineRange) -> Option<LineRange> {
		let start = self.start.max(other.start);
		let end = self.end().min(other.end());
		(start < end).then(|| LineRange::new(start, end - start))
	}

	/// Splits the range into consecutive pieces of at most `size` lines.
	pub fn chunks(self, size: usize) -> impl Iterator<Item = LineRange> {
		let size = size.max(1);
		let end = self.end();
		(self.start..end).step_by(size).map(move |start| LineRange::new(start, size.min(end - start)))
	}
}
