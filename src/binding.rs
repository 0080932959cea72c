use std::cell::Cell;
use std::fmt::Debug;

use crate::{Listener, Ref, Subscription, Value, Version};

/// What a view holds to stay in sync with a reactive value.
///
/// `on_change` is invoked on flush after the value changed; the view
/// then takes a new [`snapshot`](Binding::snapshot). Between two
/// notifications the snapshot and its version stay the same.
/// Dropping the binding unsubscribes.
pub struct Binding<T: 'static> {
	value: Value<T>,
	subscription: Option<Subscription>,
	seen: Cell<Version>,
}

impl<T: 'static> Binding<T> {
	pub(crate) fn new(value: Value<T>, on_change: impl Fn() + 'static) -> Self {
		let subscription = value.subscribe(&Listener::new(on_change));
		let seen = Cell::new(value.version());

		Binding {
			value,
			subscription: Some(subscription),
			seen,
		}
	}

	/// Latest value, read without tracking.
	pub fn snapshot(&self) -> Ref<'_, T> {
		self.seen.set(self.value.version());
		self.value.get_untracked()
	}

	pub fn read(&self) -> T
	where
		T: Clone,
	{
		self.snapshot().clone()
	}

	pub fn version(&self) -> Version {
		self.value.version()
	}

	/// Returns `true` if the value changed since the last snapshot.
	pub fn is_stale(&self) -> bool {
		self.value.version() != self.seen.get()
	}
}

impl<T: 'static> Drop for Binding<T> {
	fn drop(&mut self) {
		if let Some(subscription) = self.subscription.take() {
			subscription.unsubscribe();
		}
	}
}

impl<T: 'static> Debug for Binding<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Binding")
			.field("version", &self.version())
			.field("stale", &self.is_stale())
			.finish()
	}
}
