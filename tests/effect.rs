use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use reactive_hub::{effect, Effect, Hub, Signal};

#[test]
fn runs_once_on_creation() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 1);

	let effect = Effect::new(&hub, {
		let a = a.clone();
		move || {
			a.read();
		}
	});

	assert_eq!(effect.run_count(), 1);
	assert_eq!(effect.dependency_count(), 1);
	assert_eq!(a.listener_count(), 1);
	assert!(!hub.is_tracking());
}

#[test]
fn reading_twice_subscribes_once() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 1);

	let effect = Effect::new(&hub, {
		let a = a.clone();
		move || {
			a.read();
			a.read();
			a.with(|_| ());
		}
	});

	assert_eq!(effect.dependency_count(), 1);
	assert_eq!(a.listener_count(), 1);

	a.set(2);
	hub.run_pending();
	assert_eq!(effect.run_count(), 2);
	assert_eq!(a.listener_count(), 1);
}

#[test]
fn dependencies_grow_but_never_shrink() {
	let hub = Hub::new();
	let show = Signal::new(&hub, true);
	let detail = Signal::new(&hub, 0);

	let effect = Effect::new(&hub, {
		let show = show.clone();
		let detail = detail.clone();
		move || {
			if show.read() {
				detail.read();
			}
		}
	});
	assert_eq!(effect.dependency_count(), 2);

	show.set(false);
	hub.run_pending();
	assert_eq!(effect.run_count(), 2);

	// `detail` is no longer read, but its subscription is kept.
	detail.set(1);
	hub.run_pending();
	assert_eq!(effect.run_count(), 3);
	assert_eq!(effect.dependency_count(), 2);
}

#[test]
fn dependencies_discovered_on_rerun() {
	let hub = Hub::new();
	let show = Signal::new(&hub, false);
	let detail = Signal::new(&hub, 0);

	let effect = Effect::new(&hub, {
		let show = show.clone();
		let detail = detail.clone();
		move || {
			if show.read() {
				detail.read();
			}
		}
	});
	assert_eq!(effect.dependency_count(), 1);

	detail.set(1);
	hub.run_pending();
	assert_eq!(effect.run_count(), 1);

	show.set(true);
	hub.run_pending();
	assert_eq!(effect.run_count(), 2);
	assert_eq!(effect.dependency_count(), 2);

	detail.set(2);
	hub.run_pending();
	assert_eq!(effect.run_count(), 3);
}

#[test]
fn dispose_is_idempotent() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);

	let effect = Effect::new(&hub, {
		let a = a.clone();
		move || {
			a.read();
		}
	});

	effect.dispose();
	assert!(effect.is_disposed());
	assert_eq!(a.listener_count(), 0);
	assert_eq!(effect.dependency_count(), 0);

	effect.dispose();
	assert_eq!(a.listener_count(), 0);

	a.set(1);
	hub.run_pending();
	assert_eq!(effect.run_count(), 1);

	effect.run();
	assert_eq!(effect.run_count(), 1);
}

#[test]
fn dropping_the_last_handle_releases_subscriptions() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);

	let effect = Effect::new(&hub, {
		let a = a.clone();
		move || {
			a.read();
		}
	});
	let clone = effect.clone();
	assert!(clone.ptr_eq(&effect));

	drop(effect);
	assert_eq!(a.listener_count(), 1);

	drop(clone);
	assert_eq!(a.listener_count(), 0);
}

#[test]
fn detached_effect_keeps_running() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);
	let log = Rc::new(RefCell::new(Vec::new()));

	Effect::new(&hub, {
		let a = a.clone();
		let log = log.clone();
		move || log.borrow_mut().push(a.read())
	})
	.detach();

	a.set(1);
	hub.run_pending();
	assert_eq!(*log.borrow(), [0, 1]);
}

#[test]
fn nested_effect_restores_outer_tracking() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);
	let b = Signal::new(&hub, 0);
	let c = Signal::new(&hub, 0);
	let inner = Rc::new(RefCell::new(None));

	let outer = Effect::new(&hub, {
		let hub = hub.clone();
		let (a, b, c) = (a.clone(), b.clone(), c.clone());
		let inner = inner.clone();
		move || {
			a.read();
			if inner.borrow().is_none() {
				let effect = Effect::new(&hub, {
					let b = b.clone();
					move || {
						b.read();
					}
				});
				*inner.borrow_mut() = Some(effect);
			}
			c.read();
		}
	});

	let inner = inner.borrow().clone().expect("inner effect created");

	assert_eq!(outer.dependency_count(), 2);
	assert_eq!(inner.dependency_count(), 1);
	assert_eq!(b.listener_count(), 1);

	b.set(1);
	hub.run_pending();
	assert_eq!(outer.run_count(), 1);
	assert_eq!(inner.run_count(), 2);

	c.set(1);
	hub.run_pending();
	assert_eq!(outer.run_count(), 2);
	assert_eq!(inner.run_count(), 2);
}

#[test]
fn untracked_reads_do_not_subscribe() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);
	let b = Signal::new(&hub, 0);

	let effect = Effect::new(&hub, {
		let hub = hub.clone();
		let (a, b) = (a.clone(), b.clone());
		move || {
			a.read();
			hub.untracked(|| b.read());
			b.read_untracked();
			assert!(hub.is_tracking());
		}
	});

	assert_eq!(effect.dependency_count(), 1);
	assert_eq!(b.listener_count(), 0);
}

#[test]
fn panicking_first_run_restores_tracking() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);

	let result = panic::catch_unwind(AssertUnwindSafe(|| {
		Effect::new(&hub, {
			let a = a.clone();
			move || {
				a.read();
				panic!("first run failed");
			}
		})
	}));

	assert!(result.is_err());
	assert!(!hub.is_tracking());
	assert_eq!(a.listener_count(), 0);

	let effect = Effect::new(&hub, {
		let a = a.clone();
		move || {
			a.read();
		}
	});
	assert_eq!(effect.dependency_count(), 1);
}

#[test]
fn panicking_rerun_restores_tracking() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);
	let b = Signal::new(&hub, 0);

	let failing = Effect::new(&hub, {
		let a = a.clone();
		move || {
			if a.read() == 1 {
				panic!("rerun failed");
			}
		}
	});

	a.set(1);
	let error = hub.flush().expect_err("listener panicked");
	assert_eq!(error.message(), "rerun failed");
	assert!(!hub.is_tracking());
	assert_eq!(failing.run_count(), 2);

	let effect = Effect::new(&hub, {
		let b = b.clone();
		move || {
			b.read();
		}
	});
	assert_eq!(effect.dependency_count(), 1);
	assert_eq!(failing.dependency_count(), 1);
}

#[test]
fn disposed_while_pending_is_skipped() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 0);
	let victim: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));

	let _killer = Effect::new(&hub, {
		let a = a.clone();
		let victim = victim.clone();
		move || {
			if a.read() > 0 {
				if let Some(victim) = victim.borrow().as_ref() {
					victim.dispose();
				}
			}
		}
	});

	let target = Effect::new(&hub, {
		let a = a.clone();
		move || {
			a.read();
		}
	});
	*victim.borrow_mut() = Some(target.clone());

	a.set(1);
	assert_eq!(hub.pending_count(), 2);
	assert_eq!(hub.flush().expect("no listener panicked"), 2);
	assert_eq!(target.run_count(), 1);
	assert!(target.is_disposed());
}

#[test]
fn macro_clones_captures() {
	let hub = Hub::new();
	let a = Signal::new(&hub, 1);
	let log = Rc::new(RefCell::new(Vec::new()));

	let _effect = effect!(hub, (a, log) => log.borrow_mut().push(a.read()));

	a.set(2);
	hub.run_pending();
	assert_eq!(*log.borrow(), [1, 2]);
}

#[test]
fn hub_effect_lives_as_long_as_its_handle() {
	let hub = Hub::new();
	let s = Signal::new(&hub, 0);
	let held = Rc::new(RefCell::new(Vec::new()));
	let dropped = Rc::new(RefCell::new(Vec::new()));

	let _held = hub.effect({
		let s = s.clone();
		let held = held.clone();
		move || held.borrow_mut().push(s.read())
	});
	drop(hub.effect({
		let s = s.clone();
		let dropped = dropped.clone();
		move || dropped.borrow_mut().push(s.read())
	}));
	assert_eq!(s.listener_count(), 1);

	s.set(1);
	s.set(2);
	hub.run_pending();

	assert_eq!(*held.borrow(), [0, 2]);
	assert_eq!(*dropped.borrow(), [0]);
}
