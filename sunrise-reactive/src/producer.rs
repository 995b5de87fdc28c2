use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use log::trace;
use parking_lot::{Mutex, ReentrantMutex};

use crate::{
	ActionDisposable, CompositeDisposable, Disposable, Event, Observer, Payload, Scheduler,
	SerialDisposable, Signal,
};

type Startup<T, E> = dyn Send + Sync + Fn(Observer<T, E>, &CompositeDisposable);

/// A cold, re-runnable recipe for [`Signal`]s.
///
/// Each start creates one fresh [`Signal`] and runs the recipe for it. Starts share no state.
pub struct SignalProducer<T, E>(Arc<Startup<T, E>>);

impl<T, E> Clone for SignalProducer<T, E> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T, E> Debug for SignalProducer<T, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignalProducer").finish_non_exhaustive()
	}
}

impl<T: Payload, E: Payload> SignalProducer<T, E> {
	/// Creates a producer from its start recipe.
	///
	/// The recipe receives the input of the fresh signal and the start's lifetime.
	/// Resources it acquires **should** be added to that lifetime, which is disposed when the
	/// signal terminates or the start is disposed.
	pub fn new(
		startup: impl 'static + Send + Sync + Fn(Observer<T, E>, &CompositeDisposable),
	) -> Self {
		Self(Arc::new(startup))
	}

	/// Sends `value`, then completes.
	pub fn value(value: T) -> Self {
		Self::new(move |observer, _| {
			observer.send_value(value.clone());
			observer.send_completed();
		})
	}

	/// Sends each of `values` in order, then completes.
	pub fn values(values: impl IntoIterator<Item = T>) -> Self {
		let values: Arc<[T]> = values.into_iter().collect();
		Self::new(move |observer, lifetime| {
			for value in values.iter() {
				if lifetime.is_disposed() {
					return;
				}
				observer.send_value(value.clone());
			}
			observer.send_completed();
		})
	}

	/// Fails immediately.
	pub fn failed(error: E) -> Self {
		Self::new(move |observer, _| observer.send_failed(error.clone()))
	}

	/// Completes immediately.
	#[must_use]
	pub fn empty() -> Self {
		Self::new(|observer, _| observer.send_completed())
	}

	/// Never sends anything.
	#[must_use]
	pub fn never() -> Self {
		Self::new(|_, _| ())
	}

	/// Creates a fresh signal, lets `setup` observe it, and only then runs the recipe.
	///
	/// The recipe is skipped iff `setup` already disposed the start's lifetime.
	///
	/// **Returns** `setup`'s result and the disposable for this start.
	pub fn start_with_signal<R>(
		&self,
		setup: impl FnOnce(&Signal<T, E>, &CompositeDisposable) -> R,
	) -> (R, ActionDisposable) {
		let lifetime = CompositeDisposable::new();
		let (signal, input) = Signal::pipe_disposing(lifetime.clone());
		lifetime.add(signal.interrupter());

		let r = setup(&signal, &lifetime);
		if lifetime.is_disposed() {
			trace!("Producer start was interrupted during setup.");
		} else {
			(self.0)(input, &lifetime);
		}

		(r, ActionDisposable::new(move || lifetime.dispose()))
	}

	/// Starts the producer, forwarding to `observer`.
	///
	/// Disposing the returned disposable interrupts this start.
	pub fn start(&self, observer: Observer<T, E>) -> ActionDisposable {
		self.start_with_signal(|signal, lifetime| lifetime.add(signal.observe(observer)))
			.1
	}

	/// [`start`](`SignalProducer::start`)s with a plain event handler.
	pub fn start_with(&self, handler: impl 'static + Send + Sync + Fn(Event<T, E>)) -> ActionDisposable {
		self.start(Observer::new(handler))
	}

	/// [`start`](`SignalProducer::start`)s, handling values only.
	pub fn start_with_values(&self, handler: impl 'static + Send + Sync + Fn(T)) -> ActionDisposable {
		self.start_with(move |event| {
			if let Event::Value(value) = event {
				handler(value);
			}
		})
	}

	/// Applies `transform` to the observer of each start.
	///
	/// `transform` runs once per start, so state it creates is per start too.
	pub fn lift<U: Payload, F: Payload>(
		&self,
		transform: impl 'static + Send + Sync + Fn(Observer<U, F>) -> Observer<T, E>,
	) -> SignalProducer<U, F> {
		let source = self.clone();
		SignalProducer::new(move |observer, lifetime| {
			lifetime.add(source.start(transform(observer)));
		})
	}

	/// Maps each value.
	pub fn map<U: Payload>(&self, f: impl 'static + Send + Sync + Fn(T) -> U) -> SignalProducer<U, E> {
		let f = Arc::new(f);
		self.lift(move |downstream: Observer<U, E>| {
			let f = Arc::clone(&f);
			Observer::new(move |event: Event<T, E>| downstream.send(event.map(&*f)))
		})
	}

	/// Maps the error.
	pub fn map_error<F: Payload>(
		&self,
		f: impl 'static + Send + Sync + Fn(E) -> F,
	) -> SignalProducer<T, F> {
		let f = Arc::new(f);
		self.lift(move |downstream: Observer<T, F>| {
			let f = Arc::clone(&f);
			Observer::new(move |event: Event<T, E>| downstream.send(event.map_error(&*f)))
		})
	}

	/// Forwards only values that satisfy `predicate`.
	pub fn filter(&self, predicate: impl 'static + Send + Sync + Fn(&T) -> bool) -> Self {
		let predicate = Arc::new(predicate);
		self.lift(move |downstream: Observer<T, E>| {
			let predicate = Arc::clone(&predicate);
			Observer::new(move |event: Event<T, E>| match event {
				Event::Value(value) if !predicate(&value) => (),
				event => downstream.send(event),
			})
		})
	}

	/// Drops the first `count` values.
	#[must_use]
	pub fn skip(&self, count: usize) -> Self {
		self.lift(move |downstream: Observer<T, E>| {
			let remaining = Mutex::new(count);
			Observer::new(move |event: Event<T, E>| {
				if let Event::Value(_) = event {
					let mut remaining = remaining.lock();
					if *remaining > 0 {
						*remaining -= 1;
						return;
					}
				}
				downstream.send(event);
			})
		})
	}

	/// Drops values equal to the one forwarded before them.
	#[must_use]
	pub fn skip_repeats(&self) -> Self
	where
		T: PartialEq,
	{
		self.lift(|downstream: Observer<T, E>| {
			let previous = Mutex::new(None::<T>);
			Observer::new(move |event: Event<T, E>| {
				if let Event::Value(value) = &event {
					let mut previous = previous.lock();
					if previous.as_ref() == Some(value) {
						return;
					}
					*previous = Some(value.clone());
				}
				downstream.send(event);
			})
		})
	}

	/// Calls `f` with each event before forwarding it.
	pub fn on_event(&self, f: impl 'static + Send + Sync + Fn(&Event<T, E>)) -> Self {
		let f = Arc::new(f);
		self.lift(move |downstream: Observer<T, E>| {
			let f = Arc::clone(&f);
			Observer::new(move |event: Event<T, E>| {
				f(&event);
				downstream.send(event);
			})
		})
	}

	/// On failure, continues with the producer `handler` returns for the error.
	pub fn flat_map_error<F: Payload>(
		&self,
		handler: impl 'static + Send + Sync + Fn(E) -> SignalProducer<T, F>,
	) -> SignalProducer<T, F> {
		let source = self.clone();
		let handler = Arc::new(handler);
		SignalProducer::new(move |observer: Observer<T, F>, lifetime| {
			let recovery = SerialDisposable::new();
			lifetime.add(recovery.clone());
			let handler = Arc::clone(&handler);
			lifetime.add(source.start_with(move |event: Event<T, E>| match event {
				Event::Value(value) => observer.send_value(value),
				Event::Failed(error) => recovery.replace(handler(error).start(observer.clone())),
				Event::Completed => observer.send_completed(),
				Event::Interrupted => observer.send_interrupted(),
			}));
		})
	}

	/// Combines the latest values of `self` and `other`.
	///
	/// Sends once both sent a value, and after that on each value from either side.
	/// Fails or interrupts as soon as either side does, and completes once both completed.
	pub fn combine_latest<U: Payload>(
		&self,
		other: &SignalProducer<U, E>,
	) -> SignalProducer<(T, U), E> {
		let (left, right) = (self.clone(), other.clone());
		SignalProducer::new(move |observer: Observer<(T, U), E>, lifetime| {
			let shared = Arc::new(Combined {
				serial: ReentrantMutex::new(()),
				state: Mutex::new(CombineState {
					left: None,
					right: None,
					left_done: false,
					right_done: false,
				}),
				observer,
			});
			lifetime.add(left.start_with({
				let shared = Arc::clone(&shared);
				move |event: Event<T, E>| {
					shared.on_event(event, |state, value| state.left = Some(value), |state| {
						state.left_done = true;
					});
				}
			}));
			lifetime.add(right.start_with({
				let shared = Arc::clone(&shared);
				move |event: Event<U, E>| {
					shared.on_event(event, |state, value| state.right = Some(value), |state| {
						state.right_done = true;
					});
				}
			}));
		})
	}

	/// Forwards every event through `scheduler`.
	///
	/// Events still pending when the start is disposed are dropped.
	pub fn observe_on(&self, scheduler: impl 'static + Scheduler) -> Self {
		let source = self.clone();
		let scheduler = Arc::new(scheduler);
		SignalProducer::new(move |observer: Observer<T, E>, lifetime| {
			let scheduler = Arc::clone(&scheduler);
			let guard = lifetime.clone();
			lifetime.add(source.start_with(move |event: Event<T, E>| {
				let observer = observer.clone();
				let guard = guard.clone();
				// Cancellation is covered by `guard`.
				let _ = scheduler.schedule(Box::new(move || {
					if !guard.is_disposed() {
						observer.send(event);
					}
				}));
			}));
		})
	}
}

struct Combined<T, U, E> {
	serial: ReentrantMutex<()>,
	state: Mutex<CombineState<T, U>>,
	observer: Observer<(T, U), E>,
}

struct CombineState<T, U> {
	left: Option<T>,
	right: Option<U>,
	left_done: bool,
	right_done: bool,
}

impl<T: Payload, U: Payload, E: Payload> Combined<T, U, E> {
	fn on_event<V>(
		&self,
		event: Event<V, E>,
		store: impl FnOnce(&mut CombineState<T, U>, V),
		done: impl FnOnce(&mut CombineState<T, U>),
	) {
		let _serial = self.serial.lock();
		match event {
			Event::Value(value) => {
				let combined = {
					let mut state = self.state.lock();
					store(&mut state, value);
					state.left.clone().zip(state.right.clone())
				};
				if let Some(combined) = combined {
					self.observer.send_value(combined);
				}
			}
			Event::Failed(error) => self.observer.send_failed(error),
			Event::Completed => {
				let both = {
					let mut state = self.state.lock();
					done(&mut state);
					state.left_done && state.right_done
				};
				if both {
					self.observer.send_completed();
				}
			}
			Event::Interrupted => self.observer.send_interrupted(),
		}
	}
}
