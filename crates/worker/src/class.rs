/// Where a piece of background work runs, recorded on every spawn event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Short async coordination: timers, cancellation waits, result forwarding.
	Background,
	/// Long synchronous computation on the blocking pool.
	CpuBlocking,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::CpuBlocking => "cpu_blocking",
		}
	}
}
