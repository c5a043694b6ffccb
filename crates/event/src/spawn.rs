use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

/// Returns the entered runtime, or lazily builds the fallback runtime.
///
/// Listeners may fire from threads that never entered a runtime (file
/// watcher callbacks, plain `std::thread`s), so spawning must not panic there.
fn runtime_handle() -> Handle {
	if let Ok(handle) = Handle::try_current() {
		return handle;
	}

	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK
		.get_or_init(|| {
			Builder::new_multi_thread()
				.enable_all()
				.worker_threads(1)
				.thread_name("quire-event")
				.build()
				.unwrap_or_else(|err| panic!("failed to build quire-event fallback runtime: {err}"))
		})
		.handle()
		.clone()
}

/// Spawns a task tagged with `class` on the current or fallback runtime.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(task_class = class.as_str(), "event.spawn");
	runtime_handle().spawn(fut)
}
