use tracing::debug;
use weft_primitives::Snapshot;

use super::AsyncTagger;
use crate::producer::TagProducer;

impl<P: TagProducer> AsyncTagger<P> {
	/// Aligns cached state with `snapshot`. Idempotent.
	///
	/// A background cache for another snapshot is folded into the tracking
	/// cache, and a request for another snapshot is cancelled.
	pub(super) fn reconcile(&mut self, snapshot: &Snapshot) {
		if let Some(background) = self.background.take_if(|bg| bg.snapshot() != snapshot) {
			let converted = background.to_tracking_cache();
			let tracking = match self.tracking.take() {
				Some(existing) => converted.merge(snapshot, &existing),
				None => converted,
			};
			debug!(
				from = background.snapshot().version(),
				to = snapshot.version(),
				entries = tracking.len(),
				"tagger.reconcile"
			);
			self.tracking = Some(tracking);
		}

		if self.request.as_ref().is_some_and(|r| r.snapshot() != snapshot) {
			self.cancel_request();
		}
	}
}
