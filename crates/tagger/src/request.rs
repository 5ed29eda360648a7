//! One in-flight background request: its channel and cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use weft_primitives::Snapshot;
use weft_worker::{GenerationToken, TaskClass, join_error_panic_message};

use crate::channel::PriorityChannel;
use crate::msg::{CompletionReason, TaggerMsg};
use crate::producer::TagProducer;
use crate::visited::VisitedRangeSet;
use crate::worker::{BackgroundWork, run_in_background};

/// Inputs captured on the owning thread when a request starts.
pub(crate) struct RequestStart<P: TagProducer> {
	pub producer: Arc<P>,
	pub data: P::Data,
	pub snapshot: Snapshot,
	pub channel: Arc<PriorityChannel>,
	pub visited: VisitedRangeSet,
	pub token: GenerationToken,
	pub chunk_size: usize,
	pub delay: Option<Duration>,
	pub tx: mpsc::UnboundedSender<TaggerMsg<P::Tag>>,
}

/// Handle to a running worker.
///
/// Dropping the handle cancels the worker; its remaining messages then carry
/// a generation nobody is waiting for.
#[derive(Debug)]
pub(crate) struct BackgroundRequest {
	snapshot: Snapshot,
	channel: Arc<PriorityChannel>,
	token: GenerationToken,
}

impl BackgroundRequest {
	pub(crate) fn start<P: TagProducer>(start: RequestStart<P>) -> Self {
		let snapshot = start.snapshot.clone();
		let channel = Arc::clone(&start.channel);
		let token = start.token.clone();
		// Detached: the worker reports back through the mailbox.
		let _ = weft_worker::spawn(TaskClass::Background, drive(start));
		Self { snapshot, channel, token }
	}

	pub(crate) fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	pub(crate) fn channel(&self) -> &PriorityChannel {
		&self.channel
	}

	pub(crate) fn generation(&self) -> u64 {
		self.token.generation()
	}

	pub(crate) fn cancel(&self) {
		self.token.cancel();
	}
}

impl Drop for BackgroundRequest {
	fn drop(&mut self) {
		self.token.cancel();
	}
}

async fn drive<P: TagProducer>(start: RequestStart<P>) {
	let RequestStart {
		producer,
		data,
		snapshot,
		channel,
		mut visited,
		token,
		chunk_size,
		delay,
		tx,
	} = start;
	let generation = token.generation();

	if let Some(delay) = delay {
		tokio::select! {
			biased;
			_ = token.cancelled() => {
				let _ = tx.send(TaggerMsg::Completed { generation, reason: CompletionReason::Cancelled });
				return;
			}
			_ = tokio::time::sleep(delay) => {}
		}
	}

	let progress_tx = tx.clone();
	let joined = weft_worker::spawn_blocking(TaskClass::CpuBlocking, move || {
		let work = BackgroundWork {
			producer: producer.as_ref(),
			data: &data,
			snapshot: &snapshot,
			channel: &channel,
			cancel: token.token(),
			chunk_size,
		};
		run_in_background(work, &mut visited, |chunk| {
			let _ = progress_tx.send(TaggerMsg::Progress {
				generation,
				range: chunk.range,
				tags: chunk.tags,
				failed: chunk.failed,
			});
		})
	})
	.await;

	let reason = match joined {
		Ok(reason) => reason,
		Err(err) => {
			if let Some(panic) = join_error_panic_message(err) {
				warn!(generation, panic = %panic, "tagger.worker.panicked");
			}
			CompletionReason::Cancelled
		}
	};
	debug!(generation, reason = reason.as_str(), "tagger.worker.done");
	let _ = tx.send(TaggerMsg::Completed { generation, reason });
}
