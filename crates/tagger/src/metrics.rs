/// Counters describing tagger activity. Updated on the owning thread only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaggerMetrics {
	pub requests_started: u64,
	pub requests_cancelled: u64,
	pub chunks_computed: u64,
	pub producer_failures: u64,
	pub notifications_raised: u64,
	pub notifications_suppressed: u64,
	pub stale_messages: u64,
}
