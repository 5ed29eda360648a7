use std::any::Any;

use tokio::task::JoinError;

/// Renders a caught panic payload, if it carries a message.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_string());
	}
	payload.downcast_ref::<String>().cloned()
}

/// Extracts the panic message from a failed join, or `None` for cancellation.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	Some(panic_message(payload.as_ref()).unwrap_or_else(|| "non-string panic payload".to_string()))
}
