use std::panic::Location;

use log::trace;
use sunrise_legacy::{LegacyDisposable, LegacySignal, Object, Subscriber};
use sunrise_reactive::{Disposable, Event, Signal, SignalProducer};

use crate::{BridgeError, Bridgeable};

/// Bridges [`LegacySignal`]s to the typed runtime.
pub trait LegacySignalExt {
	/// A producer that subscribes to `self` once per start.
	///
	/// Legacy errors become [`BridgeError`]s. Untyped ones are located at the caller.
	#[track_caller]
	fn to_producer(&self) -> SignalProducer<Option<Object>, BridgeError>;
}

impl LegacySignalExt for LegacySignal {
	#[track_caller]
	fn to_producer(&self) -> SignalProducer<Option<Object>, BridgeError> {
		to_producer_at(self, Location::caller())
	}
}

/// [`LegacySignalExt::to_producer`] with an explicit `location`.
#[must_use]
pub fn to_producer_at(
	signal: &LegacySignal,
	location: &'static Location<'static>,
) -> SignalProducer<Option<Object>, BridgeError> {
	let signal = signal.clone();
	SignalProducer::new(move |observer, lifetime| {
		let (next, error, completed) = (observer.clone(), observer.clone(), observer);
		let subscription = signal.subscribe_next(
			move |value| next.send_value(value),
			move |e| error.send_failed(BridgeError::from_legacy(e.as_ref(), location)),
			move || completed.send_completed(),
		);
		lifetime.add_action(move || subscription.dispose());
	})
}

/// Bridges [`SignalProducer`]s to the legacy runtime.
pub trait ProducerExt {
	/// A legacy signal that starts `self` once per subscription.
	///
	/// [`Event::Interrupted`] has no legacy counterpart and is dropped.
	fn to_legacy_signal(&self) -> LegacySignal;
}

impl<T: Bridgeable, E: Bridgeable> ProducerExt for SignalProducer<T, E> {
	fn to_legacy_signal(&self) -> LegacySignal {
		let producer = self.clone();
		LegacySignal::create(move |subscriber| {
			let subscription = producer.start_with(forward(subscriber));
			Some(LegacyDisposable::new(move || subscription.dispose()))
		})
	}
}

/// Bridges [`Signal`]s to the legacy runtime.
pub trait SignalExt {
	/// A legacy signal that observes `self` once per subscription.
	///
	/// [`Event::Interrupted`] has no legacy counterpart and is dropped.
	fn to_legacy_signal(&self) -> LegacySignal;
}

impl<T: Bridgeable, E: Bridgeable> SignalExt for Signal<T, E> {
	fn to_legacy_signal(&self) -> LegacySignal {
		let signal = self.clone();
		LegacySignal::create(move |subscriber| {
			let observation = signal.observe_with(forward(subscriber));
			Some(LegacyDisposable::new(move || observation.dispose()))
		})
	}
}

fn forward<T: Bridgeable, E: Bridgeable>(
	subscriber: Subscriber,
) -> impl 'static + Send + Sync + Fn(Event<T, E>) {
	move |event| match event {
		Event::Value(value) => subscriber.send_next(value.into_object()),
		Event::Failed(error) => subscriber.send_error(error.into_object()),
		Event::Completed => subscriber.send_completed(),
		Event::Interrupted => trace!("Dropped an interruption at the legacy boundary."),
	}
}
