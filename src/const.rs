use std::rc::Rc;

use crate::value::Access;
use crate::{Listener, SignalKey, Source, Subscription, Value, Version};

/// A value that never changes. Subscribing to it is a no-op.
pub struct Const<T> {
	body: Rc<ConstBody<T>>,
}

impl<T> Clone for Const<T> {
	fn clone(&self) -> Self {
		Const {
			body: self.body.clone(),
		}
	}
}

pub(crate) struct ConstBody<T> {
	value: T,
}

impl<T> Const<T> {
	pub fn new(value: T) -> Self {
		Const {
			body: Rc::new(ConstBody { value }),
		}
	}

	pub fn get(&self) -> &T {
		&self.body.value
	}
}

impl<T: 'static> Source for ConstBody<T> {
	fn key(&self) -> Option<SignalKey> {
		None
	}

	fn subscribe(&self, listener: &Listener) -> Subscription {
		Subscription::inert(listener.clone())
	}

	fn unsubscribe(&self, _: &Listener) {}
}

impl<T> Access<T> for ConstBody<T>
where
	T: 'static,
{
	fn get(&self) -> crate::value::Ref<'_, T> {
		crate::value::Ref::Ref(&self.value)
	}

	fn get_untracked(&self) -> crate::value::Ref<'_, T> {
		crate::value::Ref::Ref(&self.value)
	}

	fn version(&self) -> Version {
		Version::default()
	}

	fn subscribe(&self, listener: &Listener) -> Subscription {
		Source::subscribe(self, listener)
	}
}

impl<T> From<Const<T>> for Value<T>
where
	T: 'static,
{
	fn from(value: Const<T>) -> Self {
		Value::new(value.body)
	}
}
