//! Event primitives shared by quire crates.
//!
//! - [`Emitter`] owns an ordered observer list and fires values synchronously.
//! - [`Event`] is the subscribe-only handle an emitter hands out.
//! - [`Subscription`] detaches its listener when dropped; [`SubscriptionSet`]
//!   bundles several so they can be released together.
//! - [`debounce`] coalesces bursts of an event into one trailing emission,
//!   with [`batch`] as the common "collect into a `Vec`" reducer.
//!
//! Timers backing debounced events run on the ambient Tokio runtime when one
//! is entered, otherwise on a small process-wide fallback runtime (see
//! [`spawn`]).

mod class;
mod debounce;
mod emitter;
mod spawn;
mod subscription;

pub use class::TaskClass;
pub use debounce::{Debounced, batch, debounce};
pub use emitter::{Emitter, Event};
pub use spawn::spawn;
pub use subscription::{Subscription, SubscriptionSet};
