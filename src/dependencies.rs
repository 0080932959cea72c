use fxhash::FxHashSet;
use smallvec::SmallVec;

use crate::{Listener, SignalKey, Source, Subscription};

/// Sources an effect subscribed to, with the means to leave them.
///
/// The set only grows while the effect lives: a source that is no
/// longer read by a later run stays subscribed until [`release`].
///
/// [`release`]: Dependencies::release
#[derive(Default)]
pub struct Dependencies {
	keys: FxHashSet<SignalKey>,
	subscriptions: SmallVec<[Subscription; 4]>,
}

impl Dependencies {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Subscribes `listener` to `source` unless it already is.
	/// Returns `true` if a new subscription was made.
	pub fn based_on(&mut self, source: &dyn Source, listener: &Listener) -> bool {
		let Some(key) = source.key() else {
			return false;
		};

		if !self.keys.insert(key) {
			return false;
		}

		self.subscriptions.push(source.subscribe(listener));
		true
	}

	/// Unsubscribes from every source. Returns how many.
	pub fn release(&mut self) -> usize {
		let released = self.subscriptions.len();
		for subscription in self.subscriptions.drain(..) {
			subscription.unsubscribe();
		}
		self.keys.clear();

		released
	}
}
