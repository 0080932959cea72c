use std::ops::Deref;
use std::rc::Rc;

use crate::{Binding, Const, Listener, Subscription, Version};

/// Read handle over any reactive value: a signal, a computed or a
/// constant.
pub struct Value<T> {
	value: Rc<dyn Access<T>>,
}

impl<T> Clone for Value<T> {
	fn clone(&self) -> Self {
		Value {
			value: self.value.clone(),
		}
	}
}

impl<T> Value<T>
where
	T: 'static,
{
	pub fn new(value: Rc<dyn Access<T>>) -> Self {
		Value { value }
	}

	pub fn constant(value: T) -> Self {
		Value::from(Const::new(value))
	}

	pub fn get(&self) -> Ref<'_, T> {
		self.value.get()
	}

	pub fn get_untracked(&self) -> Ref<'_, T> {
		self.value.get_untracked()
	}

	pub fn read(&self) -> T
	where
		T: Clone,
	{
		self.value.get().clone()
	}

	pub fn version(&self) -> Version {
		self.value.version()
	}

	pub fn subscribe(&self, listener: &Listener) -> Subscription {
		self.value.subscribe(listener)
	}

	pub fn bind(&self, on_change: impl Fn() + 'static) -> Binding<T> {
		Binding::new(self.clone(), on_change)
	}
}

pub enum Ref<'a, T> {
	Ref(&'a T),
	Cell(std::cell::Ref<'a, T>),
}

impl<'a, T> Deref for Ref<'a, T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		match self {
			Ref::Cell(guard) => guard.deref(),
			Ref::Ref(t) => t,
		}
	}
}

/// Uniform read access used by [`Value`] and [`Binding`].
pub trait Access<T>: 'static {
	/// Current value; subscribes the running effect, if any.
	fn get(&self) -> Ref<'_, T>;
	fn get_untracked(&self) -> Ref<'_, T>;
	fn version(&self) -> Version;
	fn subscribe(&self, listener: &Listener) -> Subscription;
}
