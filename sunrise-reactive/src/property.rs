use std::{
	collections::VecDeque,
	fmt::{self, Debug, Formatter},
	mem,
	sync::{Arc, Weak},
};

use log::error;
use parking_lot::{Mutex, ReentrantMutex};

use crate::{
	ActionDisposable, Disposable, Event, NoError, Observer, Payload, SerialDisposable, Signal,
	SignalProducer,
};

/// The read side of a bindable value.
pub trait Property<T: Payload>: Send + Sync {
	/// The current value.
	fn value(&self) -> T;

	/// Sends the current value, then every later one.
	///
	/// Completes when the property goes away.
	fn producer(&self) -> SignalProducer<T, NoError>;

	/// Sends every later value, without the current one.
	fn signal(&self) -> Signal<T, NoError>;
}

/// A mutable value cell that is an observable producer of its changes.
///
/// At most one [binding](`MutableProperty::bind`) is active at a time.
pub struct MutableProperty<T>(Arc<PropertyCore<T>>);

struct PropertyCore<T> {
	value: Mutex<T>,
	/// Orders updates and their notifications, and lets [`producer`](`Property::producer`)
	/// starts read-then-observe without missing an update.
	///
	/// Never held while a producer start sends the current value, so that its observer may
	/// take other locks freely.
	update_lock: ReentrantMutex<()>,
	changes: Signal<T, NoError>,
	input: Observer<T, NoError>,
	binding: SerialDisposable,
	bind_lock: ReentrantMutex<()>,
}

impl<T> Clone for MutableProperty<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T: Debug> Debug for MutableProperty<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("MutableProperty")
			.field(&*self.0.value.lock())
			.finish()
	}
}

impl<T: Payload + Default> Default for MutableProperty<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: Payload> MutableProperty<T> {
	/// Creates a new property holding `initial`.
	pub fn new(initial: T) -> Self {
		let (changes, input) = Signal::pipe();
		Self(Arc::new(PropertyCore {
			value: Mutex::new(initial),
			update_lock: ReentrantMutex::new(()),
			changes,
			input,
			binding: SerialDisposable::new(),
			bind_lock: ReentrantMutex::new(()),
		}))
	}

	/// Replaces the value and notifies observers.
	///
	/// Permitted while bound. The last writer wins.
	pub fn set(&self, value: T) {
		self.0.set(value);
	}

	/// Mutates the value in place, then notifies observers with the result.
	pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
		let _update = self.0.update_lock.lock();
		let (r, value) = {
			let mut current = self.0.value.lock();
			let r = f(&mut current);
			(r, current.clone())
		};
		self.0.input.send_value(value);
		r
	}

	/// Replaces the value and notifies observers.
	///
	/// **Returns** the previous value.
	pub fn swap(&self, value: T) -> T {
		self.modify(|current| mem::replace(current, value))
	}

	/// A read-only view of this property.
	#[must_use]
	pub fn read_only(&self) -> ReadOnlyProperty<T> {
		ReadOnlyProperty(self.clone())
	}

	/// Binds this property to `source`, disposing any previous binding first.
	///
	/// Each value of `source` is [`set`](`MutableProperty::set`). The binding ends when `source`
	/// terminates. A failure is logged, since properties have no error channel.
	///
	/// **Returns** a disposable that ends this binding only.
	pub fn bind<E: Payload + Debug>(&self, source: &SignalProducer<T, E>) -> ActionDisposable {
		let _bind = self.0.bind_lock.lock();
		self.0.binding.clear();

		let core = Arc::downgrade(&self.0);
		let subscription = source.start_with(move |event| match event {
			Event::Value(value) => {
				if let Some(core) = Weak::upgrade(&core) {
					core.set(value);
				}
			}
			Event::Failed(e) => error!("Property binding failed: {e:?}"),
			Event::Completed | Event::Interrupted => (),
		});
		self.0.binding.replace(subscription.clone());
		subscription
	}

	/// Ends the current binding, if any. The value stays as it is.
	pub fn unbind(&self) {
		let _bind = self.0.bind_lock.lock();
		self.0.binding.clear();
	}
}

impl<T: Payload> PropertyCore<T> {
	fn set(&self, value: T) {
		let _update = self.update_lock.lock();
		*self.value.lock() = value.clone();
		self.input.send_value(value);
	}
}

impl<T> Drop for PropertyCore<T> {
	fn drop(&mut self) {
		self.binding.dispose();
		self.input.send_completed();
	}
}

impl<T: Payload> Property<T> for MutableProperty<T> {
	fn value(&self) -> T {
		self.0.value.lock().clone()
	}

	fn producer(&self) -> SignalProducer<T, NoError> {
		let core = Arc::downgrade(&self.0);
		SignalProducer::new(move |observer, lifetime| {
			let Some(core) = Weak::upgrade(&core) else {
				observer.send_completed();
				return;
			};
			// Changes that race the current value wait here until it has been sent.
			let backlog = Arc::new(Mutex::new(Some(VecDeque::new())));
			let current = {
				let _update = core.update_lock.lock();
				lifetime.add(core.changes.observe(Observer::new({
					let (backlog, observer) = (Arc::clone(&backlog), observer.clone());
					move |event| {
						if let Some(waiting) = &mut *backlog.lock() {
							waiting.push_back(event);
							return;
						}
						observer.send(event);
					}
				})));
				core.value.lock().clone()
			};
			drop(core);

			observer.send_value(current);
			loop {
				let next = {
					let mut backlog = backlog.lock();
					match backlog.as_mut().and_then(VecDeque::pop_front) {
						Some(event) => event,
						None => {
							*backlog = None;
							break;
						}
					}
				};
				observer.send(next);
			}
		})
	}

	fn signal(&self) -> Signal<T, NoError> {
		self.0.changes.clone()
	}
}

/// A read-only view of a [`MutableProperty`].
pub struct ReadOnlyProperty<T>(MutableProperty<T>);

impl<T> Clone for ReadOnlyProperty<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: Debug> Debug for ReadOnlyProperty<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ReadOnlyProperty")
			.field(&*self.0 .0.value.lock())
			.finish()
	}
}

impl<T: Payload> Property<T> for ReadOnlyProperty<T> {
	fn value(&self) -> T {
		self.0.value()
	}

	fn producer(&self) -> SignalProducer<T, NoError> {
		self.0.producer()
	}

	fn signal(&self) -> Signal<T, NoError> {
		self.0.signal()
	}
}

/// A property that never changes.
#[derive(Clone)]
pub struct ConstantProperty<T> {
	value: T,
	signal: Signal<T, NoError>,
}

impl<T: Debug> Debug for ConstantProperty<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ConstantProperty").field(&self.value).finish()
	}
}

impl<T: Payload> ConstantProperty<T> {
	/// Creates a property that holds `value` forever.
	pub fn new(value: T) -> Self {
		let (signal, input) = Signal::pipe();
		input.send_completed();
		Self { value, signal }
	}
}

impl<T: Payload> Property<T> for ConstantProperty<T> {
	fn value(&self) -> T {
		self.value.clone()
	}

	fn producer(&self) -> SignalProducer<T, NoError> {
		SignalProducer::value(self.value.clone())
	}

	fn signal(&self) -> Signal<T, NoError> {
		self.signal.clone()
	}
}

impl<T: Payload, P: ?Sized + Property<T>> Property<T> for Arc<P> {
	fn value(&self) -> T {
		(**self).value()
	}

	fn producer(&self) -> SignalProducer<T, NoError> {
		(**self).producer()
	}

	fn signal(&self) -> Signal<T, NoError> {
		(**self).signal()
	}
}
