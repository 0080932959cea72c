use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use scopeguard::ScopeGuard;

use crate::{Dependencies, Hub, Listener, Source, Tracker};

/// Computation re-run whenever a signal it read changes.
///
/// Every run executes with this effect as the tracking context, so
/// signals read by a later run are picked up as well. Subscriptions
/// are kept across runs and released by [`Effect::dispose`], or when
/// the last handle is dropped.
#[derive(Clone)]
pub struct Effect {
	body: Rc<EffectBody>,
}

pub(crate) struct EffectBody {
	hub: Hub,
	name: &'static str,
	func: Box<dyn Fn()>,
	listener: Listener,
	dependencies: RefCell<Dependencies>,
	disposed: Cell<bool>,
	runs: Cell<usize>,
}

impl Drop for EffectBody {
	fn drop(&mut self) {
		self.dependencies.get_mut().release();
	}
}

impl Effect {
	/// Creates an effect and runs it once to gather dependencies.
	///
	/// If `func` panics, the panic propagates and the subscriptions
	/// made so far are released.
	#[must_use = "dropping the effect disposes it; hold it or call detach()"]
	pub fn new(hub: &Hub, func: impl Fn() + 'static) -> Self {
		Self::new_with_name(hub, "<unnamed>", func)
	}

	#[must_use = "dropping the effect disposes it; hold it or call detach()"]
	pub fn new_with_name(hub: &Hub, name: &'static str, func: impl Fn() + 'static) -> Self {
		let effect = Effect {
			body: Rc::new_cyclic(|this: &Weak<EffectBody>| {
				let this = this.clone();
				EffectBody {
					hub: hub.clone(),
					name,
					func: Box::new(func),
					listener: Listener::new(move || {
						if let Some(body) = this.upgrade() {
							body.run();
						}
					}),
					dependencies: RefCell::new(Dependencies::new()),
					disposed: Cell::new(false),
					runs: Cell::new(0),
				}
			}),
		};

		let effect = scopeguard::guard(effect, |effect| effect.dispose());
		effect.run();
		ScopeGuard::into_inner(effect)
	}

	pub fn name(&self) -> &'static str {
		self.body.name
	}

	/// Runs the body now, outside of any flush.
	pub fn run(&self) {
		self.body.run()
	}

	/// Listener the effect subscribes with; invoking it re-runs the effect.
	pub fn listener(&self) -> &Listener {
		&self.body.listener
	}

	pub fn run_count(&self) -> usize {
		self.body.runs.get()
	}

	pub fn dependency_count(&self) -> usize {
		self.body.dependencies.borrow().len()
	}

	pub fn is_disposed(&self) -> bool {
		self.body.disposed.get()
	}

	/// Unsubscribes from every signal read so far. The effect never
	/// runs again. Disposing twice is a no-op.
	pub fn dispose(&self) {
		self.body.disposed.set(true);
		let released = self.body.dependencies.borrow_mut().release();
		if released > 0 {
			tracing::trace!(effect = self.body.name, released, "effect disposed");
		}
	}

	/// Keeps the effect running for as long as its signals live,
	/// without holding a handle.
	pub fn detach(self) {
		std::mem::forget(self)
	}

	pub fn ptr_eq(&self, other: &Effect) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}
}

impl EffectBody {
	fn run(self: &Rc<Self>) {
		if self.disposed.get() {
			return;
		}

		let _scope = self.hub.track(self.clone());
		self.runs.set(self.runs.get() + 1);
		tracing::trace!(effect = self.name, run = self.runs.get(), "effect run");

		(self.func)();
	}
}

impl Tracker for EffectBody {
	fn track(&self, source: &dyn Source) {
		if self.disposed.get() {
			return;
		}

		if self
			.dependencies
			.borrow_mut()
			.based_on(source, &self.listener)
		{
			tracing::trace!(effect = self.name, source = ?source.key(), "dependency added");
		}
	}
}

impl Debug for Effect {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Effect")
			.field("name", &self.body.name)
			.field("runs", &self.body.runs.get())
			.field("dependencies", &self.dependency_count())
			.field("disposed", &self.body.disposed.get())
			.finish()
	}
}
