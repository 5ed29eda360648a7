//! Worker runtime helpers shared by background tagging.
//!
//! Work is spawned onto the caller's tokio runtime when one is active and onto
//! a small lazily-built global runtime otherwise, so synchronous hosts can
//! still drive background computation.

mod class;
mod panic;
mod spawn;
mod token;

pub use class::TaskClass;
pub use panic::{join_error_panic_message, panic_message};
pub use spawn::{runtime_handle, spawn, spawn_blocking};
pub use token::{GenerationClock, GenerationToken};
pub use tokio_util::sync::CancellationToken;
