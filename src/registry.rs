use std::any::Any;
use std::fmt::Display;
use std::rc::{Rc, Weak};

use fxhash::FxBuildHasher;
use indexmap::IndexMap;

/// Opaque key of a signal cell inside its [`Hub`](crate::Hub).
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct SignalKey(pub(crate) usize);

impl Display for SignalKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Auxiliary bookkeeping of every cell created through a hub.
///
/// Cells are held weakly: the registry never keeps a cell alive,
/// it only allows enumerating and looking them up by key.
/// Keys are never reused.
#[derive(Default)]
pub(crate) struct Registry {
	cells: IndexMap<SignalKey, Weak<dyn Any>, FxBuildHasher>,
	next: usize,
}

impl Registry {
	pub fn insert(&mut self, cell: Weak<dyn Any>) -> SignalKey {
		let key = SignalKey(self.next);
		self.next += 1;
		self.cells.insert(key, cell);
		key
	}

	pub fn get(&self, key: SignalKey) -> Option<Rc<dyn Any>> {
		self.cells.get(&key).and_then(|cell| cell.upgrade())
	}

	pub fn len(&self) -> usize {
		self.cells.len()
	}

	pub fn live(&self) -> usize {
		self.cells
			.values()
			.filter(|cell| cell.strong_count() > 0)
			.count()
	}

	/// Removes the entries whose cell was dropped. Returns how many.
	pub fn collect_garbage(&mut self) -> usize {
		let before = self.cells.len();
		self.cells.retain(|_, cell| cell.strong_count() > 0);
		before - self.cells.len()
	}
}
