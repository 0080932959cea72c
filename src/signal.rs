use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use fxhash::FxBuildHasher;
use indexmap::IndexSet;

use crate::value::Access;
use crate::{Binding, Computed, Hub, Listener, SignalKey, Source, Subscription, Value, Version};

/// Reactive value cell.
///
/// Reading a signal inside an effect subscribes the effect to it.
/// Writing a different value queues every subscribed listener on the
/// hub; listeners run on the next flush, never synchronously.
pub struct Signal<T> {
	body: Rc<SignalBody<T>>,
}

impl<T: 'static> From<Signal<T>> for Rc<dyn Any> {
	fn from(signal: Signal<T>) -> Self {
		signal.body
	}
}

impl<T: 'static> TryFrom<Rc<dyn Any>> for Signal<T> {
	type Error = Rc<dyn Any>;
	fn try_from(value: Rc<dyn Any>) -> Result<Self, Self::Error> {
		Rc::downcast::<SignalBody<T>>(value).map(|body| Signal { body })
	}
}

pub struct SignalBody<T> {
	hub: Hub,
	key: SignalKey,
	value: RefCell<T>,
	inner: RefCell<SignalInner<T>>,
}

struct SignalInner<T> {
	listeners: IndexSet<Listener, FxBuildHasher>,
	version: Version,
	this: Weak<SignalBody<T>>,
}

impl<T> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

pub trait Toggle {
	fn toggle(&mut self);
}

impl Toggle for bool {
	fn toggle(&mut self) {
		*self = !*self
	}
}

impl<T> Signal<T>
where
	T: 'static,
{
	pub fn new(hub: &Hub, value: T) -> Self {
		Signal {
			body: Rc::new_cyclic(|this| SignalBody {
				hub: hub.clone(),
				key: hub.register(this.clone() as Weak<dyn Any>),
				value: RefCell::new(value),
				inner: RefCell::new(SignalInner {
					listeners: IndexSet::default(),
					version: Version::default(),
					this: this.clone(),
				}),
			}),
		}
	}

	pub fn key(&self) -> SignalKey {
		self.body.key
	}

	pub fn hub(&self) -> &Hub {
		&self.body.hub
	}

	pub fn ptr_eq(&self, other: &Signal<T>) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	pub fn map<F, R>(&self, func: F) -> Computed<R>
	where
		F: Fn(&T) -> R + 'static,
		R: PartialEq + 'static,
	{
		let this = self.clone();
		Computed::new(self.hub(), move || this.with(&func))
	}

	/// Current value; subscribes the running effect, if any.
	#[inline]
	pub fn read(&self) -> T
	where
		T: Clone,
	{
		self.body.get().clone()
	}

	#[inline]
	pub fn get(&self) -> Ref<'_, T> {
		self.body.get()
	}

	#[inline]
	pub fn with<R>(&self, func: impl FnOnce(&T) -> R) -> R {
		func(&self.body.get())
	}

	#[inline]
	pub fn read_untracked(&self) -> T
	where
		T: Clone,
	{
		self.body.get_untracked().clone()
	}

	#[inline]
	pub fn get_untracked(&self) -> Ref<'_, T> {
		self.body.get_untracked()
	}

	/// Writes `value`. Returns `false`, and notifies nobody, if it
	/// equals the current value.
	#[inline]
	pub fn set(&self, value: T) -> bool
	where
		T: PartialEq,
	{
		self.body.commit(value)
	}

	/// Writes the value computed from the current one.
	///
	/// `func` must not write to this signal.
	#[inline]
	pub fn update(&self, func: impl FnOnce(&T) -> T) -> bool
	where
		T: PartialEq,
	{
		let next = func(&self.body.get_untracked());
		self.body.commit(next)
	}

	/// Mutates a copy of the current value and writes it back.
	#[inline]
	pub fn modify(&self, func: impl FnOnce(&mut T)) -> bool
	where
		T: Clone + PartialEq,
	{
		self.update(|value| {
			let mut next = value.clone();
			func(&mut next);
			next
		})
	}

	#[inline]
	pub fn toggle(&self) -> bool
	where
		T: Toggle + Clone + PartialEq,
	{
		self.modify(T::toggle)
	}

	/// Swaps in `value` and returns the previous one.
	#[inline]
	pub fn replace(&self, value: T) -> T
	where
		T: PartialEq,
	{
		self.body.replace(value)
	}

	#[inline]
	pub fn subscribe(&self, listener: &Listener) -> Subscription {
		Source::subscribe(&*self.body, listener)
	}

	pub fn listener_count(&self) -> usize {
		self.body.inner.borrow().listeners.len()
	}

	pub fn version(&self) -> Version {
		self.body.inner.borrow().version
	}

	/// Subscribes a view to this signal; see [`Binding`].
	pub fn bind(&self, on_change: impl Fn() + 'static) -> Binding<T> {
		Binding::new(Value::from(self.clone()), on_change)
	}
}

impl<T> SignalBody<T>
where
	T: 'static,
{
	pub fn get(&self) -> Ref<'_, T> {
		if let Some(tracker) = self.hub.current_tracker() {
			tracker.track(self);
		}

		self.value.borrow()
	}

	pub fn get_untracked(&self) -> Ref<'_, T> {
		self.value.borrow()
	}

	pub fn version(&self) -> Version {
		self.inner.borrow().version
	}

	fn commit(&self, next: T) -> bool
	where
		T: PartialEq,
	{
		{
			let mut value = self.value.borrow_mut();
			if *value == next {
				return false;
			}
			*value = next;
		}

		self.notify();
		true
	}

	fn replace(&self, next: T) -> T
	where
		T: PartialEq,
	{
		let (prev, changed) = {
			let mut value = self.value.borrow_mut();
			let changed = *value != next;
			(std::mem::replace(&mut *value, next), changed)
		};

		if changed {
			self.notify();
		}

		prev
	}

	fn notify(&self) {
		{
			let mut inner = self.inner.borrow_mut();
			inner.version = inner.version.next();

			tracing::trace!(
				signal = %self.key,
				listeners = inner.listeners.len(),
				"signal changed"
			);

			for listener in &inner.listeners {
				self.hub.enqueue(listener);
			}
		}

		self.hub.schedule_flush();
	}
}

impl<T: 'static> Source for SignalBody<T> {
	fn key(&self) -> Option<SignalKey> {
		Some(self.key)
	}

	fn subscribe(&self, listener: &Listener) -> Subscription {
		let mut inner = self.inner.borrow_mut();
		inner.listeners.insert(listener.clone());
		Subscription::new(inner.this.clone() as Weak<dyn Source>, listener.clone())
	}

	fn unsubscribe(&self, listener: &Listener) {
		self.inner.borrow_mut().listeners.shift_remove(listener);
	}
}

impl<T> Access<T> for SignalBody<T>
where
	T: 'static,
{
	fn get(&self) -> crate::value::Ref<'_, T> {
		crate::value::Ref::Cell(SignalBody::get(self))
	}

	fn get_untracked(&self) -> crate::value::Ref<'_, T> {
		crate::value::Ref::Cell(SignalBody::get_untracked(self))
	}

	fn version(&self) -> Version {
		SignalBody::version(self)
	}

	fn subscribe(&self, listener: &Listener) -> Subscription {
		Source::subscribe(self, listener)
	}
}

impl<T> From<Signal<T>> for Value<T>
where
	T: 'static,
{
	fn from(signal: Signal<T>) -> Self {
		Value::new(signal.body)
	}
}

impl<T> Debug for Signal<T>
where
	T: 'static + Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Signal")
			.field("key", &self.body.key)
			.field("value", &*self.get_untracked())
			.finish()
	}
}
