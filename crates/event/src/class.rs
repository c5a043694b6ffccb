/// Execution classes attached to spawned work for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work a caller is actively waiting on, such as a model load.
	Interactive,
	/// Deferred work nobody awaits directly, such as debounce timers.
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
