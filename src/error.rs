use std::any::Any;

/// Failure of a flush pass.
///
/// Every listener captured by the pass is attempted even if some of
/// them panic; the error reports the last panic.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
	#[error("{count} listener(s) panicked during flush, last: {message}")]
	ListenerPanicked {
		count: usize,
		message: String,
		payload: Box<dyn Any + Send>,
	},
}

impl FlushError {
	pub(crate) fn panicked(count: usize, payload: Box<dyn Any + Send>) -> Self {
		FlushError::ListenerPanicked {
			count,
			message: panic_message(payload.as_ref()),
			payload,
		}
	}

	pub fn count(&self) -> usize {
		match self {
			FlushError::ListenerPanicked { count, .. } => *count,
		}
	}

	pub fn message(&self) -> &str {
		match self {
			FlushError::ListenerPanicked { message, .. } => message,
		}
	}

	/// Re-raise the last listener panic on the current thread.
	pub fn resume(self) -> ! {
		match self {
			FlushError::ListenerPanicked { payload, .. } => std::panic::resume_unwind(payload),
		}
	}
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		(*message).to_owned()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		String::from("<non-string panic payload>")
	}
}
