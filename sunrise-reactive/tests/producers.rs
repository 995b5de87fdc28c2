use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Barrier,
	},
	thread,
};

use futures_lite::{future::block_on, StreamExt};
use sunrise_reactive::{
	shadow_clone, Disposable, Event, NoError, Observer, Payload, Signal, SignalProducer,
};

#[path = "../../test-support/_validator.rs"]
mod _validator;
use _validator::Validator;

fn from_signal<T: Payload>(signal: Signal<T, NoError>) -> SignalProducer<T, NoError> {
	SignalProducer::new(move |observer: Observer<T, NoError>, lifetime| {
		lifetime.add(signal.observe(observer));
	})
}

#[test]
fn values_then_completed() {
	let v = Arc::new(Validator::new());
	let _ = SignalProducer::<i32, NoError>::values([1, 2, 3]).start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	v.expect([
		Event::Value(1),
		Event::Value(2),
		Event::Value(3),
		Event::Completed,
	]);
}

#[test]
fn starts_are_independent() {
	let starts = Arc::new(AtomicUsize::new(0));
	let inputs = Arc::new(inputs::Inputs::default());
	let producer = SignalProducer::<usize, NoError>::new({
		shadow_clone!(starts, inputs);
		move |observer, _| {
			starts.fetch_add(1, Ordering::SeqCst);
			inputs.push(observer);
		}
	});

	let (a, b) = (Arc::new(Validator::new()), Arc::new(Validator::new()));
	let first = producer.start_with({
		shadow_clone!(a);
		move |event| a.push(event)
	});
	let _second = producer.start_with({
		shadow_clone!(b);
		move |event| b.push(event)
	});
	assert_eq!(starts.load(Ordering::SeqCst), 2);

	inputs.get(0).send_value(1);
	inputs.get(1).send_value(2);
	first.dispose();
	inputs.get(0).send_value(3);
	inputs.get(1).send_value(4);

	a.expect([Event::Value(1), Event::Interrupted]);
	b.expect([Event::Value(2), Event::Value(4)]);
}

#[test]
fn disposal_releases_recipe_resources() {
	let released = Arc::new(AtomicUsize::new(0));
	let producer = SignalProducer::<(), NoError>::new({
		shadow_clone!(released);
		move |_, lifetime| {
			shadow_clone!(released);
			lifetime.add_action(move || {
				released.fetch_add(1, Ordering::SeqCst);
			});
		}
	});

	let subscription = producer.start_with(|_| ());
	assert_eq!(released.load(Ordering::SeqCst), 0);
	subscription.dispose();
	subscription.dispose();
	assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn terminal_releases_recipe_resources() {
	let released = Arc::new(AtomicUsize::new(0));
	let producer = SignalProducer::<(), NoError>::new({
		shadow_clone!(released);
		move |observer, lifetime| {
			shadow_clone!(released);
			lifetime.add_action(move || {
				released.fetch_add(1, Ordering::SeqCst);
			});
			observer.send_completed();
		}
	});

	let _ = producer.start_with(|_| ());
	assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn operators() {
	let v = Arc::new(Validator::new());
	let _ = SignalProducer::<i32, NoError>::values([1, 1, 2, 3, 3, 4, 5, 6])
		.skip_repeats()
		.filter(|n| n % 2 == 0)
		.map(|n| n * 10)
		.skip(1)
		.start_with({
			shadow_clone!(v);
			move |event| v.push(event)
		});
	v.expect([Event::Value(40), Event::Value(60), Event::Completed]);
}

#[test]
fn flat_map_error_recovers() {
	let v = Arc::new(Validator::new());
	let _ = SignalProducer::<i32, &str>::new(|observer, _| {
		observer.send_value(1);
		observer.send_failed("boom");
	})
	.flat_map_error(|error| {
		assert_eq!(error, "boom");
		SignalProducer::<i32, NoError>::values([2, 3])
	})
	.start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	v.expect([
		Event::Value(1),
		Event::Value(2),
		Event::Value(3),
		Event::Completed,
	]);
}

#[test]
fn combine_latest_waits_for_both() {
	let (left, left_input) = Signal::<i32, NoError>::pipe();
	let (right, right_input) = Signal::<&str, NoError>::pipe();
	let v = Arc::new(Validator::new());
	let _ = from_signal(left).combine_latest(&from_signal(right)).start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});

	left_input.send_value(1);
	left_input.send_value(2);
	v.expect([]);
	right_input.send_value("a");
	left_input.send_value(3);
	left_input.send_completed();
	right_input.send_value("b");
	v.expect([
		Event::Value((2, "a")),
		Event::Value((3, "a")),
		Event::Value((3, "b")),
	]);
	right_input.send_completed();
	v.expect([Event::Completed]);
}

#[test]
fn late_observers_complete() {
	let (signal, input) = Signal::<i32, &str>::pipe();
	input.send_failed("gone");

	let v = Arc::new(Validator::new());
	let _ = signal.observe_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	v.expect([Event::Completed]);
	assert!(signal.is_terminated());
}

#[test]
fn stream_ends_after_terminal() {
	let events: Vec<_> = block_on(
		SignalProducer::<i32, &str>::new(|observer, _| {
			observer.send_value(1);
			observer.send_failed("x");
			observer.send_value(2);
		})
		.into_stream()
		.collect(),
	);
	assert_eq!(events, [Event::Value(1), Event::Failed("x")]);

	assert_eq!(
		block_on(SignalProducer::<i32, NoError>::values([7, 8]).first()),
		Some(Ok(7))
	);
	assert_eq!(block_on(SignalProducer::<i32, NoError>::empty().first()), None);
}

#[test]
fn disposal_during_delivery_on_another_thread() {
	let inputs = Arc::new(inputs::Inputs::default());
	let upstream = Arc::new(Validator::new());
	let producer = SignalProducer::<usize, NoError>::new({
		shadow_clone!(inputs);
		move |observer, _| inputs.push(observer)
	})
	.on_event({
		shadow_clone!(upstream);
		move |event| upstream.push(event.clone())
	});

	// Both threads meet once the delivery is underway, and again once it may finish.
	let (entered, release) = (Arc::new(Barrier::new(2)), Arc::new(Barrier::new(2)));
	let downstream = Arc::new(Validator::new());
	let subscription = producer.start_with({
		shadow_clone!(downstream, entered, release);
		move |event| {
			if event == Event::Value(1) {
				entered.wait();
				release.wait();
			}
			downstream.push(event);
		}
	});

	let sender = {
		let input = inputs.get(0);
		thread::spawn(move || input.send_value(1))
	};
	entered.wait();
	subscription.dispose();
	release.wait();
	sender.join().unwrap();

	inputs.get(0).send_value(2);
	upstream.expect([Event::Value(1), Event::Interrupted]);
	downstream.expect([Event::Value(1), Event::Interrupted]);
}

mod inputs {
	use std::sync::Mutex;

	use sunrise_reactive::{NoError, Observer};

	#[derive(Default)]
	pub(super) struct Inputs(Mutex<Vec<Observer<usize, NoError>>>);

	impl Inputs {
		pub(super) fn push(&self, observer: Observer<usize, NoError>) {
			self.0.lock().unwrap().push(observer);
		}

		pub(super) fn get(&self, index: usize) -> Observer<usize, NoError> {
			self.0.lock().unwrap()[index].clone()
		}
	}
}
