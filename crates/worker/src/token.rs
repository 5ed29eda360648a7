use tokio_util::sync::CancellationToken;

/// Issues request generations, starting at 1. Zero is never issued.
#[derive(Debug, Default)]
pub struct GenerationClock {
	last: u64,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn next(&mut self) -> u64 {
		self.last = self.last.wrapping_add(1).max(1);
		self.last
	}
}

/// Generation-scoped cancellation token.
///
/// The generation identifies one request; results tagged with an older
/// generation are stale no matter whether cancellation was observed.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	pub fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation. Safe to call repeatedly.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	/// Returns the underlying token for collaborators that poll it directly.
	pub fn token(&self) -> &CancellationToken {
		&self.cancel
	}
}
