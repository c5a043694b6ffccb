//! Synchronous fan-out of values to ordered listener lists.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::Subscription;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
	next_id: u64,
	entries: BTreeMap<u64, Listener<T>>,
	disposed: bool,
}

struct Shared<T> {
	listeners: Mutex<Listeners<T>>,
}

impl<T: 'static> Shared<T> {
	fn detach(&self, id: u64) {
		self.listeners.lock().entries.remove(&id);
	}
}

/// Owner side of an event stream.
///
/// Listeners run synchronously inside [`Emitter::fire`], in subscription
/// order. The listener list is snapshotted before delivery and no lock is
/// held while a listener runs, so listeners may subscribe, unsubscribe or
/// fire other emitters freely. A listener detached mid-delivery still
/// receives the value currently being fired.
pub struct Emitter<T> {
	shared: Arc<Shared<T>>,
}

impl<T: 'static> Emitter<T> {
	pub fn new() -> Self {
		Self {
			shared: Arc::new(Shared {
				listeners: Mutex::new(Listeners {
					next_id: 0,
					entries: BTreeMap::new(),
					disposed: false,
				}),
			}),
		}
	}

	/// Returns a subscribe-only handle to this emitter.
	pub fn event(&self) -> Event<T> {
		Event {
			shared: Arc::clone(&self.shared),
		}
	}

	/// Delivers `value` to every current listener, returning how many ran.
	pub fn fire(&self, value: &T) -> usize {
		let snapshot: Vec<Listener<T>> = {
			let listeners = self.shared.listeners.lock();
			if listeners.disposed {
				return 0;
			}
			listeners.entries.values().cloned().collect()
		};
		for listener in &snapshot {
			listener(value);
		}
		snapshot.len()
	}

	pub fn listener_count(&self) -> usize {
		self.shared.listeners.lock().entries.len()
	}

	pub fn has_listeners(&self) -> bool {
		self.listener_count() > 0
	}

	/// Drops every listener; later subscriptions are inert and fires no-op.
	pub fn dispose(&self) {
		let dropped = {
			let mut listeners = self.shared.listeners.lock();
			listeners.disposed = true;
			std::mem::take(&mut listeners.entries)
		};
		trace!(listeners = dropped.len(), "event.emitter.dispose");
	}

	pub fn is_disposed(&self) -> bool {
		self.shared.listeners.lock().disposed
	}
}

impl<T: 'static> Default for Emitter<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for Emitter<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let listeners = self.shared.listeners.lock();
		f.debug_struct("Emitter")
			.field("listeners", &listeners.entries.len())
			.field("disposed", &listeners.disposed)
			.finish()
	}
}

/// Subscribe-only handle to an [`Emitter`].
pub struct Event<T> {
	shared: Arc<Shared<T>>,
}

impl<T: 'static> Event<T> {
	/// Attaches `listener`; it stays attached while the returned handle lives.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		let id = {
			let mut listeners = self.shared.listeners.lock();
			if listeners.disposed {
				trace!("event.subscribe_after_dispose");
				return Subscription::empty();
			}
			let id = listeners.next_id;
			listeners.next_id += 1;
			listeners.entries.insert(id, Arc::new(listener));
			id
		};

		let shared: Weak<Shared<T>> = Arc::downgrade(&self.shared);
		Subscription::new(move || {
			if let Some(shared) = shared.upgrade() {
				shared.detach(id);
			}
		})
	}

	/// Returns true when both handles point at the same emitter.
	pub fn same_stream(&self, other: &Event<T>) -> bool {
		Arc::ptr_eq(&self.shared, &other.shared)
	}
}

impl<T> Clone for Event<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Arc::clone(&self.shared),
		}
	}
}

impl<T> fmt::Debug for Event<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("stream", &Arc::as_ptr(&self.shared))
			.finish()
	}
}
