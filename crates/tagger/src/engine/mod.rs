//! The tagger engine.
//!
//! All cache state lives on the owning thread. Queries answer synchronously
//! from whatever is cached and queue missing lines for one background worker
//! per snapshot; the worker's results come back through a mailbox that the
//! owner drains with [`AsyncTagger::drain_messages`] or
//! [`AsyncTagger::next_message`].

mod lifecycle;
mod query;
mod reconcile;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;
use weft_primitives::{Snapshot, Span};
use weft_worker::GenerationClock;

use crate::cache::{BackgroundCache, CacheState, TrackingCache};
use crate::config::TaggerCfg;
use crate::metrics::TaggerMetrics;
use crate::msg::{TaggerMsg, TaggerNotifier, TagsChanged};
use crate::producer::TagProducer;
use crate::request::BackgroundRequest;

/// Serves tags for a versioned document, computing them incrementally in
/// the background.
pub struct AsyncTagger<P: TagProducer> {
	producer: Arc<P>,
	cfg: TaggerCfg,
	background: Option<BackgroundCache<P::Tag>>,
	tracking: Option<TrackingCache<P::Tag>>,
	request: Option<BackgroundRequest>,
	/// Union of every span queried so far, carried across snapshots.
	requested: Option<Span>,
	clock: GenerationClock,
	tx: mpsc::UnboundedSender<TaggerMsg<P::Tag>>,
	/// `None` once disposed.
	rx: Option<mpsc::UnboundedReceiver<TaggerMsg<P::Tag>>>,
	subscribers: Vec<mpsc::UnboundedSender<TagsChanged>>,
	metrics: TaggerMetrics,
}

impl<P: TagProducer> AsyncTagger<P> {
	pub fn new(producer: Arc<P>) -> Self {
		Self::with_cfg(producer, TaggerCfg::default())
	}

	pub fn with_cfg(producer: Arc<P>, cfg: TaggerCfg) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			producer,
			cfg: cfg.normalized(),
			background: None,
			tracking: None,
			request: None,
			requested: None,
			clock: GenerationClock::new(),
			tx,
			rx: Some(rx),
			subscribers: Vec::new(),
			metrics: TaggerMetrics::default(),
		}
	}

	pub fn producer(&self) -> &Arc<P> {
		&self.producer
	}

	pub fn cfg(&self) -> &TaggerCfg {
		&self.cfg
	}

	pub fn metrics(&self) -> &TaggerMetrics {
		&self.metrics
	}

	/// Returns a handle for raising producer and viewport signals from any thread.
	pub fn notifier(&self) -> TaggerNotifier<P::Tag> {
		TaggerNotifier::new(self.tx.clone())
	}

	/// Registers for [`TagsChanged`] events.
	///
	/// Dropped receivers are pruned on the next event.
	pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TagsChanged> {
		let (tx, rx) = mpsc::unbounded_channel();
		if !self.is_disposed() {
			self.subscribers.push(tx);
		}
		rx
	}

	/// Applies every queued message without waiting. Returns how many were applied.
	pub fn drain_messages(&mut self) -> usize {
		let mut applied = 0;
		while let Some(msg) = self.rx.as_mut().and_then(|rx| rx.try_recv().ok()) {
			self.apply(msg);
			applied += 1;
		}
		applied
	}

	/// Waits for one message and applies it. Returns false once disposed.
	pub async fn next_message(&mut self) -> bool {
		let Some(rx) = self.rx.as_mut() else {
			return false;
		};
		let Some(msg) = rx.recv().await else {
			return false;
		};
		self.apply(msg);
		true
	}

	/// Applies messages until no background request remains active.
	pub async fn run_until_idle(&mut self) {
		loop {
			self.drain_messages();
			if self.request.is_none() || !self.next_message().await {
				return;
			}
		}
	}

	fn apply(&mut self, msg: TaggerMsg<P::Tag>) {
		match msg {
			TaggerMsg::Progress {
				generation,
				range,
				tags,
				failed,
			} => self.on_progress(generation, range, tags, failed),
			TaggerMsg::Completed { generation, reason } => self.on_complete(generation, reason),
			TaggerMsg::ProducerChanged => self.on_producer_changed(),
			TaggerMsg::ViewportChanged => self.on_viewport_changed(),
		}
	}

	/// Cancels background work, drops caches and subscribers, and closes the mailbox.
	///
	/// Later queries only consult the producer's prompt path.
	pub fn dispose(&mut self) {
		let Some(mut rx) = self.rx.take() else {
			return;
		};
		rx.close();
		self.cancel_request();
		self.background = None;
		self.tracking = None;
		self.subscribers.clear();
		debug!("tagger.disposed");
	}

	pub fn is_disposed(&self) -> bool {
		self.rx.is_none()
	}

	/// Classifies `span` against the background cache.
	pub fn cache_state(&self, span: &Span) -> CacheState {
		self.background.as_ref().map_or(CacheState::None, |bg| bg.state(span))
	}

	pub fn has_active_request(&self) -> bool {
		self.request.is_some()
	}

	pub fn active_request_snapshot(&self) -> Option<&Snapshot> {
		self.request.as_ref().map(BackgroundRequest::snapshot)
	}

	pub fn has_tracking_cache(&self) -> bool {
		self.tracking.is_some()
	}

	pub fn requested_span(&self) -> Option<&Span> {
		self.requested.as_ref()
	}

	fn is_current(&self, generation: u64) -> bool {
		self.request.as_ref().is_some_and(|r| r.generation() == generation)
	}

	fn raise(&mut self, span: Span) {
		self.metrics.notifications_raised += 1;
		debug!(
			start = span.start(),
			end = span.end(),
			subscribers = self.subscribers.len(),
			"tagger.changed"
		);
		self.subscribers.retain(|tx| tx.send(TagsChanged { span: span.clone() }).is_ok());
	}
}

impl<P: TagProducer> Drop for AsyncTagger<P> {
	fn drop(&mut self) {
		self.dispose();
	}
}

#[cfg(test)]
mod tests;
