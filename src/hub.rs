use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use fxhash::FxBuildHasher;
use indexmap::IndexSet;

use crate::error::panic_message;
use crate::registry::Registry;
use crate::tracking::{Tracking, TrackingStack};
use crate::{
	Computed, Effect, FlushError, Listener, ManualScheduler, Scheduler, Signal, SignalKey, Tracker,
};

/// Dependency hub: the reactive context every signal, effect and
/// computed belongs to.
///
/// A hub owns the tracking context, the pending listeners and the
/// flush scheduler. Independent hubs do not see each other: a signal
/// is tracked only by effects of its own hub, so reading a signal of
/// another hub inside an effect does not subscribe that effect.
#[derive(Clone)]
pub struct Hub {
	inner: Rc<HubInner>,
}

struct HubInner {
	tracking: TrackingStack,
	pending: RefCell<IndexSet<Listener, FxBuildHasher>>,
	scheduled: Cell<bool>,
	scheduler: Box<dyn Scheduler>,
	manual: Option<ManualScheduler>,
	registry: RefCell<Registry>,
}

impl Default for Hub {
	fn default() -> Self {
		Hub::new()
	}
}

impl Hub {
	/// Creates a hub whose flushes run on [`Hub::run_pending`].
	pub fn new() -> Self {
		let manual = ManualScheduler::new();
		Self::build(Box::new(manual.clone()), Some(manual))
	}

	pub fn with_scheduler(scheduler: impl Scheduler) -> Self {
		Self::build(Box::new(scheduler), None)
	}

	fn build(scheduler: Box<dyn Scheduler>, manual: Option<ManualScheduler>) -> Self {
		Hub {
			inner: Rc::new(HubInner {
				tracking: TrackingStack::default(),
				pending: RefCell::new(IndexSet::default()),
				scheduled: Cell::new(false),
				scheduler,
				manual,
				registry: RefCell::new(Registry::default()),
			}),
		}
	}

	pub fn create_signal<T: 'static>(&self, value: T) -> Signal<T> {
		Signal::new(self, value)
	}

	#[must_use = "dropping the effect disposes it; hold it or call detach()"]
	pub fn effect(&self, func: impl Fn() + 'static) -> Effect {
		Effect::new(self, func)
	}

	pub fn computed<U: PartialEq + 'static>(&self, func: impl Fn() -> U + 'static) -> Computed<U> {
		Computed::new(self, func)
	}

	pub fn ptr_eq(&self, other: &Hub) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Returns `true` while an effect body is being evaluated.
	pub fn is_tracking(&self) -> bool {
		self.inner.tracking.current().is_some()
	}

	pub(crate) fn current_tracker(&self) -> Option<Rc<dyn Tracker>> {
		self.inner.tracking.current()
	}

	/// Makes `tracker` the current tracking context until the
	/// returned scope is dropped. Scopes must be dropped in reverse
	/// order of creation.
	pub(crate) fn track(&self, tracker: Rc<dyn Tracker>) -> Tracking<'_> {
		self.inner.tracking.push(Some(tracker))
	}

	/// Runs `func` with tracking suspended.
	pub fn untracked<R>(&self, func: impl FnOnce() -> R) -> R {
		let _scope = self.inner.tracking.push(None);
		func()
	}

	/// Adds `listener` to the next flush. Enqueueing a listener
	/// that is already pending keeps its original position.
	pub fn enqueue(&self, listener: &Listener) {
		self.inner.pending.borrow_mut().insert(listener.clone());
	}

	pub fn pending_count(&self) -> usize {
		self.inner.pending.borrow().len()
	}

	pub fn is_flush_scheduled(&self) -> bool {
		self.inner.scheduled.get()
	}

	/// Asks the scheduler to flush once the current turn is over.
	/// At most one flush is in flight at a time.
	pub fn schedule_flush(&self) {
		if self.inner.scheduled.replace(true) {
			return;
		}

		tracing::trace!("flush scheduled");

		let hub = Rc::downgrade(&self.inner);
		self.inner.scheduler.schedule(Box::new(move || run_scheduled(hub)));
	}

	/// Notifies every pending listener once, in first-enqueued order.
	///
	/// Listeners enqueued while flushing wait for the next flush.
	/// A panicking listener does not stop the pass; the last panic is
	/// reported once every listener has been attempted.
	pub fn flush(&self) -> Result<usize, FlushError> {
		let pending = std::mem::take(&mut *self.inner.pending.borrow_mut());
		self.inner.scheduled.set(false);

		if pending.is_empty() {
			return Ok(0);
		}

		tracing::trace!(listeners = pending.len(), "flush");

		let mut panicked = 0;
		let mut last = None;
		for listener in &pending {
			if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener.call())) {
				panicked += 1;
				tracing::error!(
					message = %panic_message(payload.as_ref()),
					"listener panicked during flush"
				);
				last = Some(payload);
			}
		}

		match last {
			Some(payload) => Err(FlushError::panicked(panicked, payload)),
			None => Ok(pending.len()),
		}
	}

	/// Ends the current turn of a hub created with [`Hub::new`]:
	/// runs the scheduled flush and every flush it cascades into.
	///
	/// Hubs with a custom scheduler are driven by that scheduler;
	/// for them this runs a single pending flush directly.
	pub fn run_pending(&self) -> usize {
		match &self.inner.manual {
			Some(manual) => manual.run_pending(),
			None if self.is_flush_scheduled() => {
				run_scheduled(Rc::downgrade(&self.inner));
				1
			}
			None => 0,
		}
	}

	pub(crate) fn register(&self, cell: Weak<dyn Any>) -> SignalKey {
		self.inner.registry.borrow_mut().insert(cell)
	}

	/// Looks up a live signal created through this hub.
	pub fn signal<T: 'static>(&self, key: SignalKey) -> Option<Signal<T>> {
		let cell = self.inner.registry.borrow().get(key)?;
		Signal::try_from(cell).ok()
	}

	/// Number of registered cells, including dropped ones not yet collected.
	pub fn signal_count(&self) -> usize {
		self.inner.registry.borrow().len()
	}

	pub fn live_signal_count(&self) -> usize {
		self.inner.registry.borrow().live()
	}

	/// Forgets registry entries of dropped cells.
	pub fn collect_garbage(&self) -> usize {
		let collected = self.inner.registry.borrow_mut().collect_garbage();
		tracing::trace!(collected, "registry garbage collected");
		collected
	}
}

fn run_scheduled(hub: Weak<HubInner>) {
	let Some(inner) = hub.upgrade() else {
		return;
	};

	if let Err(error) = (Hub { inner }).flush() {
		error.resume()
	}
}

impl Debug for Hub {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Hub")
			.field("tracking", &self.is_tracking())
			.field("pending", &self.pending_count())
			.field("scheduled", &self.is_flush_scheduled())
			.field("signals", &self.signal_count())
			.finish()
	}
}
