//! Trailing debounce over an [`Event`].
//!
//! Every source firing folds into an accumulator and restarts the window
//! timer. When the window elapses with no further firing, the accumulator is
//! emitted once and reset.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::{Emitter, Event, Subscription, TaskClass, spawn};

struct Window<A> {
	acc: Option<A>,
	generation: u64,
}

struct DebounceState<A> {
	output: Emitter<A>,
	window: Mutex<Window<A>>,
}

impl<A: Send + 'static> DebounceState<A> {
	fn flush(&self, generation: u64) {
		let acc = {
			let mut window = self.window.lock();
			if window.generation != generation {
				return;
			}
			window.acc.take()
		};
		if let Some(acc) = acc {
			let listeners = self.output.fire(&acc);
			trace!(generation, listeners, "event.debounce.flush");
		}
	}
}

/// A debounced view of a source event.
///
/// Holds the source subscription; dropping it stops the debouncing and
/// discards anything still accumulating.
pub struct Debounced<A> {
	state: Arc<DebounceState<A>>,
	_source: Subscription,
}

impl<A: Send + 'static> Debounced<A> {
	/// Subscribe-only handle to the coalesced stream.
	pub fn event(&self) -> Event<A> {
		self.state.output.event()
	}

	/// Stops delivery to current and future listeners.
	pub fn dispose(&self) {
		self.state.window.lock().acc = None;
		self.state.output.dispose();
	}
}

impl<A> fmt::Debug for Debounced<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Debounced").field("output", &self.state.output).finish()
	}
}

/// Builds a trailing-debounced stream from `source`.
///
/// `reduce` folds each source value into the pending accumulator (`None` at
/// the start of a window). Timers run on the runtime current at fire time.
pub fn debounce<T, A, R>(source: &Event<T>, window: Duration, reduce: R) -> Debounced<A>
where
	T: 'static,
	A: Send + 'static,
	R: Fn(Option<A>, &T) -> A + Send + Sync + 'static,
{
	let state = Arc::new(DebounceState {
		output: Emitter::new(),
		window: Mutex::new(Window { acc: None, generation: 0 }),
	});

	let weak: Weak<DebounceState<A>> = Arc::downgrade(&state);
	let source = source.subscribe(move |value| {
		let Some(state) = weak.upgrade() else {
			return;
		};
		let generation = {
			let mut pending = state.window.lock();
			pending.acc = Some(reduce(pending.acc.take(), value));
			pending.generation = pending.generation.wrapping_add(1);
			pending.generation
		};

		let timer = Arc::downgrade(&state);
		spawn(TaskClass::Background, async move {
			tokio::time::sleep(window).await;
			if let Some(state) = timer.upgrade() {
				state.flush(generation);
			}
		});
	});

	Debounced { state, _source: source }
}

/// Reducer appending each value to an ordered batch.
pub fn batch<T: Clone>(acc: Option<Vec<T>>, value: &T) -> Vec<T> {
	let mut items = acc.unwrap_or_default();
	items.push(value.clone());
	items
}

#[cfg(test)]
mod tests;
