use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::time::sleep;

use super::*;

const WINDOW: Duration = Duration::from_millis(250);

fn collect<A: Clone + Send + 'static>(event: &Event<A>) -> (Arc<Mutex<Vec<A>>>, Subscription) {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let sub = event.subscribe(move |value: &A| sink.lock().push(value.clone()));
	(seen, sub)
}

#[tokio::test(start_paused = true)]
async fn burst_within_window_emits_one_ordered_batch() {
	let source = Emitter::<u32>::new();
	let batched = debounce(&source.event(), WINDOW, batch::<u32>);
	let (seen, _sub) = collect(&batched.event());

	source.fire(&1);
	source.fire(&2);
	source.fire(&3);
	sleep(WINDOW + Duration::from_millis(10)).await;

	assert_eq!(*seen.lock(), vec![vec![1, 2, 3]]);
}

#[tokio::test(start_paused = true)]
async fn firing_restarts_the_window() {
	let source = Emitter::<u32>::new();
	let batched = debounce(&source.event(), WINDOW, batch::<u32>);
	let (seen, _sub) = collect(&batched.event());

	source.fire(&1);
	sleep(Duration::from_millis(200)).await;
	source.fire(&2);
	sleep(Duration::from_millis(200)).await;
	assert!(seen.lock().is_empty());

	sleep(Duration::from_millis(100)).await;
	assert_eq!(*seen.lock(), vec![vec![1, 2]]);
}

#[tokio::test(start_paused = true)]
async fn separated_bursts_emit_separately() {
	let source = Emitter::<u32>::new();
	let batched = debounce(&source.event(), WINDOW, batch::<u32>);
	let (seen, _sub) = collect(&batched.event());

	source.fire(&1);
	sleep(WINDOW * 2).await;
	source.fire(&2);
	source.fire(&3);
	sleep(WINDOW * 2).await;

	assert_eq!(*seen.lock(), vec![vec![1], vec![2, 3]]);
}

#[tokio::test(start_paused = true)]
async fn custom_reducer_folds_values() {
	let source = Emitter::<u32>::new();
	let summed = debounce(&source.event(), WINDOW, |acc: Option<u32>, v: &u32| acc.unwrap_or(0) + v);
	let (seen, _sub) = collect(&summed.event());

	for v in 1..=4 {
		source.fire(&v);
	}
	sleep(WINDOW * 2).await;

	assert_eq!(*seen.lock(), vec![10]);
}

#[tokio::test(start_paused = true)]
async fn dropping_debounced_discards_pending_batch() {
	let source = Emitter::<u32>::new();
	let batched = debounce(&source.event(), WINDOW, batch::<u32>);
	let (seen, _sub) = collect(&batched.event());

	source.fire(&1);
	drop(batched);
	sleep(WINDOW * 2).await;

	assert!(seen.lock().is_empty());
	assert!(!source.has_listeners());
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_delivery() {
	let source = Emitter::<u32>::new();
	let batched = debounce(&source.event(), WINDOW, batch::<u32>);
	let (seen, _sub) = collect(&batched.event());

	source.fire(&1);
	batched.dispose();
	source.fire(&2);
	sleep(WINDOW * 2).await;

	assert!(seen.lock().is_empty());
}
