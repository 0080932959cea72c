use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub type Task = Box<dyn FnOnce()>;

/// Runs a task once the current synchronous turn has finished.
///
/// A hub hands its flush to the scheduler; the scheduler decides
/// where the turn boundary is.
pub trait Scheduler: 'static {
	fn schedule(&self, task: Task);
}

/// FIFO of deferred tasks drained explicitly by the host.
///
/// Every call to [`ManualScheduler::run_pending`] is one turn end.
#[derive(Clone, Default)]
pub struct ManualScheduler {
	queue: Rc<RefCell<VecDeque<Task>>>,
}

impl ManualScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn pending(&self) -> usize {
		self.queue.borrow().len()
	}

	/// Runs tasks until the queue is empty, including the ones
	/// scheduled by the tasks themselves. Returns how many ran.
	pub fn run_pending(&self) -> usize {
		let mut ran = 0;
		loop {
			let task = self.queue.borrow_mut().pop_front();
			match task {
				Some(task) => {
					task();
					ran += 1;
				}
				None => break,
			}
		}

		ran
	}

	/// Runs only the tasks queued before this call.
	pub fn run_once(&self) -> usize {
		let tasks = std::mem::take(&mut *self.queue.borrow_mut());
		let ran = tasks.len();
		for task in tasks {
			task();
		}

		ran
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&self, task: Task) {
		self.queue.borrow_mut().push_back(task);
	}
}

#[cfg(feature = "futures")]
impl Scheduler for futures::executor::LocalSpawner {
	fn schedule(&self, task: Task) {
		use futures::task::LocalSpawnExt;

		if let Err(error) = self.spawn_local(async move { task() }) {
			tracing::error!(%error, "failed to schedule flush, executor is shut down");
		}
	}
}
