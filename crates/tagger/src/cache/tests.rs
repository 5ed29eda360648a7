use weft_primitives::{Document, LineRange, Snapshot, SnapshotLineRange, Span, TrackingSpan};

use super::{BackgroundCache, CacheState, TrackingCache};
use crate::producer::TagSpan;

fn numbered_doc(lines: usize) -> Document {
	let text: String = (0..lines).map(|i| format!("line {i}\n")).collect();
	Document::new(text.as_str())
}

fn lines_span(snapshot: &Snapshot, start: usize, end: usize) -> Span {
	let rope = snapshot.rope();
	Span::new(snapshot, rope.line_to_char(start), rope.line_to_char(end))
}

/// One tag per line covering the line's text, tagged with its line number.
fn line_tags(snapshot: &Snapshot, range: LineRange) -> Vec<TagSpan<usize>> {
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

fn cache_over(snapshot: &Snapshot, range: LineRange) -> BackgroundCache<usize> {
	let lines = SnapshotLineRange::new(snapshot, range).unwrap();
	BackgroundCache::new(&lines, line_tags(snapshot, range))
}

#[test]
fn state_classifies_queries() {
	let s1 = numbered_doc(30).current();
	let cache = cache_over(&s1, LineRange::new(0, 10));

	assert_eq!(cache.state(&lines_span(&s1, 0, 10)), CacheState::Complete);
	assert_eq!(cache.state(&lines_span(&s1, 5, 20)), CacheState::Partial);
	assert_eq!(cache.state(&lines_span(&s1, 15, 25)), CacheState::None);
}

#[test]
fn state_is_none_for_other_snapshots() {
	let mut doc = numbered_doc(30);
	let s1 = doc.current();
	let cache = cache_over(&s1, LineRange::new(0, 10));
	let s2 = doc.insert(0, "x").unwrap();
	assert_eq!(cache.state(&lines_span(&s2, 0, 5)), CacheState::None);
}

#[test]
fn add_extends_coverage() {
	let s1 = numbered_doc(30).current();
	let mut cache = cache_over(&s1, LineRange::new(0, 10));
	cache.add(LineRange::new(10, 10), line_tags(&s1, LineRange::new(10, 10)));
	assert_eq!(cache.state(&lines_span(&s1, 5, 20)), CacheState::Complete);
	assert_eq!(cache.tags().len(), 20);
	assert_eq!(cache.tags_intersecting(&lines_span(&s1, 3, 5)).count(), 2);
}

#[test]
fn tracking_round_trip_on_same_snapshot() {
	let s1 = numbered_doc(20).current();
	let cache = cache_over(&s1, LineRange::new(0, 10));
	let tracking = cache.to_tracking_cache();

	assert!(tracking.contains_cached_tags(&lines_span(&s1, 0, 1)));
	assert_eq!(tracking.cached_tags(&s1), cache.tags());
}

#[test]
fn tracking_projects_over_inserted_line() {
	let mut doc = numbered_doc(20);
	let s1 = doc.current();
	let tracking = cache_over(&s1, LineRange::new(0, 10)).to_tracking_cache();

	let line5 = s1.rope().line_to_char(5);
	let s2 = doc.insert(line5, "new\n").unwrap();
	let tags = tracking.cached_tags(&s2);

	assert_eq!(tags.len(), 10);
	for tag in &tags {
		let line = s2.rope().char_to_line(tag.span.start());
		let expected = if tag.tag < 5 { tag.tag } else { tag.tag + 1 };
		assert_eq!(line, expected, "tag {} landed on line {line}", tag.tag);
		assert_eq!(tag.span.len(), format!("line {}", tag.tag).len());
	}
}

#[test]
fn tracking_drops_deleted_entries() {
	let mut doc = numbered_doc(10);
	let s1 = doc.current();
	let tracking = cache_over(&s1, LineRange::new(0, 10)).to_tracking_cache();

	let rope = s1.rope();
	let s2 = doc.delete(rope.line_to_char(2), rope.line_to_char(4)).unwrap();
	let mut lines: Vec<_> = tracking.cached_tags(&s2).into_iter().map(|t| t.tag).collect();
	lines.sort_unstable();
	assert_eq!(lines, vec![0, 1, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn merge_dedups_by_resolved_span() {
	let mut doc = numbered_doc(20);
	let s1 = doc.current();
	let a = cache_over(&s1, LineRange::new(0, 6)).to_tracking_cache();
	let b = cache_over(&s1, LineRange::new(3, 6)).to_tracking_cache();
	let s2 = doc.insert(s1.len_chars(), "tail\n").unwrap();

	let merged = a.merge(&s2, &b);
	let mut lines: Vec<_> = merged.cached_tags(&s2).into_iter().map(|t| t.tag).collect();
	lines.sort_unstable();
	assert_eq!(lines, (0..9).collect::<Vec<_>>());

	let extent = merged.anchor().span_on(&s2).unwrap();
	assert_eq!(extent.bounds(), lines_span(&s2, 0, 9).bounds());
}

#[test]
fn merge_falls_back_to_surviving_anchor() {
	let mut doc = numbered_doc(20);
	let s1 = doc.current();
	let doomed = cache_over(&s1, LineRange::new(2, 2)).to_tracking_cache();
	let kept = cache_over(&s1, LineRange::new(10, 2)).to_tracking_cache();

	let rope = s1.rope();
	let s2 = doc.delete(rope.line_to_char(1), rope.line_to_char(5)).unwrap();
	let merged = doomed.merge(&s2, &kept);

	assert!(merged.contains_cached_tags(&Span::point(&s2, 0)));
	assert_eq!(merged.anchor().span_on(&s2).unwrap().bounds(), lines_span(&s2, 6, 8).bounds());
	assert_eq!(merged.len(), 2);
}

#[test]
fn merge_with_no_surviving_anchor_starts_at_zero() {
	let mut doc = numbered_doc(5);
	let s1 = doc.current();
	let a = TrackingCache::<usize>::new(TrackingSpan::new(lines_span(&s1, 1, 2)), []);
	let b = TrackingCache::<usize>::new(TrackingSpan::new(lines_span(&s1, 2, 3)), []);
	let rope = s1.rope();
	let s2 = doc.delete(rope.line_to_char(1), rope.line_to_char(3)).unwrap();

	let merged = a.merge(&s2, &b);
	assert_eq!(merged.anchor().origin(), &Span::point(&s2, 0));
	assert!(merged.is_empty());
}

#[test]
fn empty_background_cache_tracks_from_origin() {
	let s1 = numbered_doc(3).current();
	let cache = BackgroundCache::<usize>::from_parts(s1.clone(), Default::default(), Vec::new());
	let tracking = cache.to_tracking_cache();
	assert_eq!(tracking.anchor().origin(), &Span::point(&s1, 0));
	assert_eq!(cache.state(&Span::whole(&s1)), CacheState::None);
}

#[test]
fn recomputing_lines_replaces_their_tags() {
	let s = numbered_doc(20).current();
	let mut cache = cache_over(&s, LineRange::new(5, 5));

	cache.add(LineRange::new(0, 20), line_tags(&s, LineRange::new(0, 20)));

	assert_eq!(cache.tags().len(), 20);
	let mut lines: Vec<_> = cache.tags().iter().map(|t| t.tag).collect();
	lines.sort_unstable();
	assert_eq!(lines, (0..20).collect::<Vec<_>>());
	assert_eq!(cache.state(&lines_span(&s, 0, 20)), CacheState::Complete);
}

#[test]
fn disjoint_add_keeps_existing_tags() {
	let s = numbered_doc(20).current();
	let mut cache = cache_over(&s, LineRange::new(0, 5));

	cache.add(LineRange::new(10, 5), line_tags(&s, LineRange::new(10, 5)));

	assert_eq!(cache.tags().len(), 10);
	assert_eq!(cache.state(&lines_span(&s, 0, 15)), CacheState::Partial);
}
