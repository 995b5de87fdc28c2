use std::{
	sync::{Arc, Barrier},
	thread,
};

use sunrise_reactive::{
	shadow_clone, ConstantProperty, Disposable, Event, MutableProperty, NoError, Property,
	Signal, SignalProducer,
};

#[path = "../../test-support/_validator.rs"]
mod _validator;
use _validator::Validator;

fn from_signal(signal: Signal<i32, &'static str>) -> SignalProducer<i32, &'static str> {
	SignalProducer::new(move |observer, lifetime| {
		lifetime.add(signal.observe(observer));
	})
}

#[test]
fn producer_sends_current_then_changes() {
	let property = MutableProperty::new(1);
	let v = Arc::new(Validator::new());
	let _ = property.producer().start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});

	property.set(2);
	property.modify(|n| *n += 1);
	assert_eq!(property.swap(10), 3);
	assert_eq!(property.value(), 10);

	v.expect([
		Event::Value(1),
		Event::Value(2),
		Event::Value(3),
		Event::Value(10),
	]);
}

#[test]
fn signal_skips_current() {
	let property = MutableProperty::new("a");
	let v = Arc::new(Validator::new());
	let _ = property.signal().observe_values({
		shadow_clone!(v);
		move |value| v.push(value)
	});
	property.set("b");
	v.expect(["b"]);
}

#[test]
fn rebinding_disposes_the_previous_binding() {
	let property = MutableProperty::new(0);
	let (first, first_input) = Signal::pipe();
	let (second, second_input) = Signal::pipe();

	let first_binding = property.bind(&from_signal(first.clone()));
	first_input.send_value(1);
	assert_eq!(property.value(), 1);

	let _ = property.bind(&from_signal(second));
	assert!(first_binding.is_disposed());
	assert!(format!("{first:?}").contains("observers: 0"));

	first_input.send_value(2);
	assert_eq!(property.value(), 1);
	second_input.send_value(3);
	assert_eq!(property.value(), 3);

	property.set(4);
	assert_eq!(property.value(), 4);
	second_input.send_value(5);
	assert_eq!(property.value(), 5);

	property.unbind();
	second_input.send_value(6);
	assert_eq!(property.value(), 5);
}

#[test]
fn binding_ends_on_failure_and_keeps_value() {
	let property = MutableProperty::new(0);
	let (source, input) = Signal::pipe();
	let _ = property.bind(&from_signal(source.clone()));

	input.send_value(1);
	input.send_failed("broken");
	assert_eq!(property.value(), 1);
	assert!(source.is_terminated());

	property.set(2);
	assert_eq!(property.value(), 2);
}

#[test]
fn dropping_completes_observers() {
	let property = MutableProperty::new(0_u8);
	let v = Arc::new(Validator::new());
	let _ = property.producer().start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	let producer = property.producer();

	drop(property);
	v.expect([Event::Value(0), Event::Completed]);

	let _ = producer.start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	v.expect([Event::Completed]);
}

#[test]
fn constant() {
	let property = ConstantProperty::new(7);
	assert_eq!(property.value(), 7);

	let v = Arc::new(Validator::<Event<i32, NoError>>::new());
	let _ = property.producer().start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	let _ = property.signal().observe_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	v.expect([Event::Value(7), Event::Completed, Event::Completed]);
}

#[test]
fn read_only_shares_state() {
	let property = MutableProperty::new(1);
	let read_only = property.read_only();
	property.set(2);
	assert_eq!(read_only.value(), 2);
}

#[test]
fn racing_binds_leave_one_binding() {
	const THREADS: usize = 8;
	let property = MutableProperty::new(0);
	let pipes: Vec<_> = (0..THREADS).map(|_| Signal::pipe()).collect();

	let barrier = Arc::new(Barrier::new(THREADS));
	let binders: Vec<_> = pipes
		.iter()
		.map(|(source, _)| {
			let source = from_signal(source.clone());
			shadow_clone!(property, barrier);
			thread::spawn(move || {
				barrier.wait();
				let _ = property.bind(&source);
			})
		})
		.collect();
	for binder in binders {
		binder.join().unwrap();
	}

	let bound: Vec<_> = pipes
		.iter()
		.filter(|(source, _)| format!("{source:?}").contains("observers: 1"))
		.collect();
	assert_eq!(bound.len(), 1);

	for (value, (_, input)) in (1..).zip(&pipes) {
		input.send_value(value);
	}
	let winner = property.value();
	assert_ne!(winner, 0);
	for (_, input) in &pipes {
		input.send_value(-1);
	}
	assert_eq!(property.value(), -1);
	bound[0].1.send_value(winner);
	assert_eq!(property.value(), winner);
}

#[test]
fn producer_started_during_updates_keeps_their_order() {
	const UPDATES: i32 = 10_000;
	let property = MutableProperty::new(0);
	let setter = {
		shadow_clone!(property);
		thread::spawn(move || {
			for value in 1..=UPDATES {
				property.set(value);
			}
		})
	};

	let v = Arc::new(Validator::new());
	let _ = property.producer().start_with_values({
		shadow_clone!(v);
		move |value| v.push(value)
	});
	setter.join().unwrap();

	let seen = v.take();
	assert!(seen.windows(2).all(|pair| pair[0] < pair[1]), "{seen:?}");
	assert_eq!(seen.last(), Some(&UPDATES));
}
