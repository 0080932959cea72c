use std::cell::RefCell;
use std::rc::Rc;

use crate::Tracker;

pub(crate) type Frame = Option<Rc<dyn Tracker>>;

/// Stack of tracking contexts of a hub.
///
/// The top frame is the current tracking context; an empty frame
/// means reads are untracked.
#[derive(Default)]
pub(crate) struct TrackingStack {
	frames: RefCell<Vec<Frame>>,
}

impl TrackingStack {
	pub fn push(&self, frame: Frame) -> Tracking<'_> {
		let mut frames = self.frames.borrow_mut();
		frames.push(frame);

		Tracking {
			stack: self,
			depth: frames.len(),
		}
	}

	pub fn current(&self) -> Option<Rc<dyn Tracker>> {
		self.frames.borrow().last().cloned().flatten()
	}
}

/// Scope of a tracking context.
///
/// Restores the enclosing context when dropped, including while
/// unwinding from a panicking effect body.
#[must_use]
pub(crate) struct Tracking<'a> {
	stack: &'a TrackingStack,
	depth: usize,
}

impl Drop for Tracking<'_> {
	fn drop(&mut self) {
		let mut frames = self.stack.frames.borrow_mut();
		debug_assert_eq!(frames.len(), self.depth, "tracking scopes dropped out of order");
		frames.truncate(self.depth - 1);
	}
}

#[cfg(test)]
mod tests {
	use std::panic::{self, AssertUnwindSafe};

	use super::*;
	use crate::Source;

	struct Noop;

	impl Tracker for Noop {
		fn track(&self, _: &dyn Source) {}
	}

	#[test]
	fn scope_pops_while_unwinding() {
		let stack = TrackingStack::default();
		let tracker: Rc<dyn Tracker> = Rc::new(Noop);
		let _outer = stack.push(Some(tracker));

		let result = panic::catch_unwind(AssertUnwindSafe(|| {
			let _inner = stack.push(None);
			assert!(stack.current().is_none());
			panic!("inner");
		}));

		assert!(result.is_err());
		assert!(stack.current().is_some());
	}
}
