pub mod macros;

mod binding;
mod computed;
mod r#const;
mod dependencies;
mod effect;
mod error;
mod hub;
mod listener;
mod registry;
mod scheduler;
mod signal;
mod tracking;
mod value;

#[cfg(target_arch = "wasm32")]
mod microtask;

pub use binding::Binding;
pub use computed::Computed;
pub use dependencies::Dependencies;
pub use effect::Effect;
pub use error::FlushError;
pub use hub::Hub;
pub use listener::{Listener, Subscription};
pub use r#const::Const;
pub use registry::SignalKey;
pub use scheduler::{ManualScheduler, Scheduler, Task};
pub use signal::{Signal, Toggle};
pub use value::{Access, Ref, Value};

#[cfg(target_arch = "wasm32")]
pub use microtask::Microtask;

/// Something listeners can be attached to.
pub trait Source: 'static {
	/// Identity of this source inside its hub.
	fn key(&self) -> Option<SignalKey>;

	/// Attach `listener`. Adding the same listener twice is a no-op.
	fn subscribe(&self, listener: &Listener) -> Subscription;

	/// Detach `listener`, if attached.
	fn unsubscribe(&self, listener: &Listener);
}

/// Receives the sources read while it is the current tracking context.
pub trait Tracker: 'static {
	fn track(&self, source: &dyn Source);
}

/// Commit counter of a reactive value.
///
/// Stays the same between two notifications unless a write
/// actually changed the value.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Default, Hash)]
pub struct Version(pub u64);

impl Version {
	pub(crate) fn next(self) -> Version {
		Version(self.0 + 1)
	}
}
