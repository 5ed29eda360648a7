use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

/// Returns the caller's runtime, or a shared fallback when called from plain threads.
pub fn runtime_handle() -> Handle {
	Handle::try_current().unwrap_or_else(|_| fallback().handle().clone())
}

fn fallback() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		tracing::debug!("worker.fallback_runtime.start");
		Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("weft-worker")
			.build()
			.expect("weft-worker: cannot build fallback runtime")
	})
}

/// Spawns async work.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	runtime_handle().spawn(fut)
}

/// Spawns synchronous work onto the blocking pool.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_blocking");
	runtime_handle().spawn_blocking(f)
}
