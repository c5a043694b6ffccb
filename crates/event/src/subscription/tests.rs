use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn counting() -> (Arc<AtomicUsize>, Subscription) {
	let count = Arc::new(AtomicUsize::new(0));
	let c = Arc::clone(&count);
	let sub = Subscription::new(move || {
		c.fetch_add(1, Ordering::SeqCst);
	});
	(count, sub)
}

#[test]
fn drop_detaches_once() {
	let (count, sub) = counting();
	assert!(sub.is_active());
	drop(sub);
	assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn dispose_detaches_once() {
	let (count, sub) = counting();
	sub.dispose();
	assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_is_inactive() {
	assert!(!Subscription::empty().is_active());
}

#[test]
fn set_clear_releases_all_and_stays_usable() {
	let mut set = SubscriptionSet::new();
	let (a, sub_a) = counting();
	let (b, sub_b) = counting();
	set.add(sub_a);
	set.add(sub_b);
	assert_eq!(set.len(), 2);

	set.clear();
	assert!(set.is_empty());
	assert_eq!(a.load(Ordering::SeqCst), 1);
	assert_eq!(b.load(Ordering::SeqCst), 1);

	let (c, sub_c) = counting();
	set.add(sub_c);
	assert_eq!(set.len(), 1);
	assert_eq!(c.load(Ordering::SeqCst), 0);
}

#[test]
fn add_after_dispose_detaches_immediately() {
	let mut set = SubscriptionSet::new();
	set.dispose();
	assert!(set.is_disposed());

	let (count, sub) = counting();
	set.add(sub);
	assert!(set.is_empty());
	assert_eq!(count.load(Ordering::SeqCst), 1);
}
