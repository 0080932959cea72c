use std::cell::{OnceCell, Ref};
use std::fmt::Debug;
use std::rc::Rc;

use crate::value::Access;
use crate::{Binding, Effect, Hub, Listener, Signal, SignalKey, Subscription, Value, Version};

/// Cached value derived from other signals.
///
/// Nothing is evaluated until the first read. The first read creates
/// an effect that evaluates `func` and publishes the result through an
/// internal signal, so reading a computed from another effect tracks
/// it like any signal. Recomputation happens on flush, after one of
/// the signals `func` read has changed.
pub struct Computed<U>
where
	U: PartialEq + 'static,
{
	body: Rc<ComputedBody<U>>,
}

impl<U> Clone for Computed<U>
where
	U: PartialEq + 'static,
{
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

pub struct ComputedBody<U>
where
	U: PartialEq + 'static,
{
	hub: Hub,
	func: Rc<dyn Fn() -> U>,
	signal: Rc<OnceCell<Signal<U>>>,
	effect: OnceCell<Effect>,
}

impl<U> Computed<U>
where
	U: PartialEq + 'static,
{
	pub fn new(hub: &Hub, func: impl Fn() -> U + 'static) -> Self {
		Computed {
			body: Rc::new(ComputedBody {
				hub: hub.clone(),
				func: Rc::new(func),
				signal: Rc::new(OnceCell::new()),
				effect: OnceCell::new(),
			}),
		}
	}

	pub fn is_initialized(&self) -> bool {
		self.body.effect.get().is_some()
	}

	/// Current value; subscribes the running effect, if any.
	#[inline]
	pub fn value(&self) -> U
	where
		U: Clone,
	{
		self.body.get().clone()
	}

	#[inline]
	pub fn get(&self) -> Ref<'_, U> {
		self.body.get()
	}

	#[inline]
	pub fn with<R>(&self, func: impl FnOnce(&U) -> R) -> R {
		func(&self.body.get())
	}

	#[inline]
	pub fn get_untracked(&self) -> Ref<'_, U> {
		self.body.signal().get_untracked()
	}

	pub fn subscribe(&self, listener: &Listener) -> Subscription {
		self.body.signal().subscribe(listener)
	}

	pub fn version(&self) -> Version {
		self.body.signal().version()
	}

	/// Key of the internal signal, once initialized.
	pub fn key(&self) -> Option<SignalKey> {
		self.body.signal.get().map(Signal::key)
	}

	/// Stops recomputation. Later reads return the last value.
	pub fn cleanup(&self) {
		if let Some(effect) = self.body.effect.get() {
			effect.dispose();
		}
	}

	/// Subscribes a view to this computed; see [`Binding`].
	pub fn bind(&self, on_change: impl Fn() + 'static) -> Binding<U> {
		Binding::new(Value::from(self.clone()), on_change)
	}
}

impl<U> ComputedBody<U>
where
	U: PartialEq + 'static,
{
	fn get(&self) -> Ref<'_, U> {
		self.signal().get()
	}

	fn signal(&self) -> &Signal<U> {
		if self.effect.get().is_none() {
			self.init();
		}

		self.signal
			.get()
			.expect("computed effect publishes its first value before returning")
	}

	fn init(&self) {
		let hub = self.hub.clone();
		let func = self.func.clone();
		let slot = self.signal.clone();

		let effect = Effect::new_with_name(&self.hub, "computed", move || {
			let value = func();
			match slot.get() {
				Some(signal) => {
					signal.set(value);
				}
				None => {
					let _ = slot.set(Signal::new(&hub, value));
				}
			}
		});

		let _ = self.effect.set(effect);
	}
}

impl<U> Access<U> for ComputedBody<U>
where
	U: PartialEq + 'static,
{
	fn get(&self) -> crate::value::Ref<'_, U> {
		crate::value::Ref::Cell(ComputedBody::get(self))
	}

	fn get_untracked(&self) -> crate::value::Ref<'_, U> {
		crate::value::Ref::Cell(self.signal().get_untracked())
	}

	fn version(&self) -> Version {
		self.signal().version()
	}

	fn subscribe(&self, listener: &Listener) -> Subscription {
		self.signal().subscribe(listener)
	}
}

impl<U> From<Computed<U>> for Value<U>
where
	U: PartialEq + 'static,
{
	fn from(computed: Computed<U>) -> Self {
		Value::new(computed.body)
	}
}

impl<U> Debug for Computed<U>
where
	U: PartialEq + Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut debug = f.debug_struct("Computed");
		match self.body.signal.get() {
			Some(signal) => debug.field("value", &*signal.get_untracked()),
			None => debug.field("value", &"<uninitialized>"),
		};
		debug.finish()
	}
}
