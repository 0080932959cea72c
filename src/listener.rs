use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::Source;

/// A zero-argument callback compared by reference.
///
/// Two listeners are the same only if they were cloned from the
/// same [`Listener::new`] call. Wrapping an identical closure twice
/// yields two distinct listeners.
#[derive(Clone)]
pub struct Listener {
	func: Rc<dyn Fn()>,
}

impl Listener {
	pub fn new(func: impl Fn() + 'static) -> Self {
		Listener {
			func: Rc::new(func),
		}
	}

	#[inline]
	pub fn call(&self) {
		(self.func)()
	}

	/// Thin address of the callback, used for identity.
	pub fn addr(&self) -> *const () {
		Rc::as_ptr(&self.func).cast()
	}
}

impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		self.addr() == other.addr()
	}
}

impl Eq for Listener {}

impl Hash for Listener {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.addr().hash(state);
	}
}

impl Debug for Listener {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Listener").field(&self.addr()).finish()
	}
}

/// One-shot capability to remove a listener from a source.
///
/// Dropping a subscription does not unsubscribe.
pub struct Subscription {
	source: Weak<dyn Source>,
	listener: Listener,
}

impl Subscription {
	pub(crate) fn new(source: Weak<dyn Source>, listener: Listener) -> Self {
		Subscription { source, listener }
	}

	/// A subscription to a source that never notifies.
	pub(crate) fn inert(listener: Listener) -> Self {
		Subscription {
			source: Weak::<crate::r#const::ConstBody<()>>::new(),
			listener,
		}
	}

	pub fn listener(&self) -> &Listener {
		&self.listener
	}

	pub fn unsubscribe(self) {
		if let Some(source) = self.source.upgrade() {
			source.unsubscribe(&self.listener);
		}
	}
}

impl Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("listener", &self.listener)
			.field("alive", &(self.source.strong_count() > 0))
			.finish()
	}
}
