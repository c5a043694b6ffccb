//! Detach handles returned by [`Event::subscribe`](crate::Event::subscribe).

use std::fmt;

use tracing::trace;

/// Handle that keeps a listener attached.
///
/// Dropping the handle (or calling [`Subscription::dispose`]) detaches the
/// listener. Detaching twice is impossible; the detach action runs once.
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription {
	detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
	/// Wraps an arbitrary detach action.
	pub fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
		Self {
			detach: Some(Box::new(detach)),
		}
	}

	/// A handle with nothing to detach.
	pub fn empty() -> Self {
		Self { detach: None }
	}

	/// Returns true until the handle has been disposed.
	pub fn is_active(&self) -> bool {
		self.detach.is_some()
	}

	/// Detaches the listener now.
	pub fn dispose(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish()
	}
}

/// Owned bag of subscriptions released together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
	subscriptions: Vec<Subscription>,
	disposed: bool,
}

impl SubscriptionSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes ownership of `subscription`.
	///
	/// Adding to a disposed set detaches the subscription right away.
	pub fn add(&mut self, subscription: Subscription) {
		if self.disposed {
			trace!("event.subscription_set.add_after_dispose");
			drop(subscription);
			return;
		}
		self.subscriptions.push(subscription);
	}

	pub fn len(&self) -> usize {
		self.subscriptions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.subscriptions.is_empty()
	}

	/// Detaches everything but keeps accepting new subscriptions.
	pub fn clear(&mut self) {
		self.subscriptions.clear();
	}

	/// Detaches everything; later additions are detached on arrival.
	pub fn dispose(&mut self) {
		self.disposed = true;
		self.clear();
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed
	}
}

#[cfg(test)]
mod tests;
