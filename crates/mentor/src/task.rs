//! Task spawning with class-tagged tracing.

use std::future::Future;
use std::sync::LazyLock;

use tokio::runtime::{self, Handle, Runtime};
use tokio::task::JoinHandle;

/// Execution classes used for spawn tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work on the panel's message path (inbound pump, diagnostics fan-in).
	Interactive,
	/// Deferred work whose result may arrive after the panel is gone.
	Background,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}

/// Runtime for callers outside any tokio context, such as a synchronous host
/// command handler. `None` if it could not be built.
static FALLBACK: LazyLock<Option<Runtime>> = LazyLock::new(|| {
	match runtime::Builder::new_multi_thread()
		.worker_threads(1)
		.thread_name("mentor-fallback")
		.enable_time()
		.build()
	{
		Ok(runtime) => Some(runtime),
		Err(err) => {
			tracing::error!(error = %err, "mentor.spawn.fallback_unavailable");
			None
		}
	}
});

fn handle() -> Option<Handle> {
	Handle::try_current()
		.ok()
		.or_else(|| FALLBACK.as_ref().map(|runtime| runtime.handle().clone()))
}

/// Spawns `fut` on the ambient runtime, or on the fallback one outside tokio.
///
/// Returns `None` (and drops `fut`) only when no runtime is available at all.
pub fn spawn<F>(class: TaskClass, fut: F) -> Option<JoinHandle<F::Output>>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let Some(handle) = handle() else {
		tracing::error!(task_class = class.as_str(), "mentor.spawn.no_runtime");
		return None;
	};
	tracing::trace!(task_class = class.as_str(), "mentor.spawn");
	Some(handle.spawn(fut))
}
