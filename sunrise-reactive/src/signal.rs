use std::{
	collections::BTreeMap,
	fmt::{self, Debug, Formatter},
	mem,
	sync::{
		atomic::{AtomicBool, AtomicU8, Ordering},
		Arc, Weak,
	},
};

use log::trace;
use parking_lot::{Mutex, ReentrantMutex};

use crate::{ActionDisposable, CompositeDisposable, Disposable, Event, Payload};

/// Receives the [`Event`]s of a [`Signal`].
pub struct Observer<T, E>(Arc<dyn Send + Sync + Fn(Event<T, E>)>);

impl<T, E> Clone for Observer<T, E> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T, E> Debug for Observer<T, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Observer").finish_non_exhaustive()
	}
}

impl<T, E> Observer<T, E> {
	/// Creates an observer from its event handler.
	pub fn new(handler: impl 'static + Send + Sync + Fn(Event<T, E>)) -> Self {
		Self(Arc::new(handler))
	}

	/// Forwards `event` to the handler.
	pub fn send(&self, event: Event<T, E>) {
		(self.0)(event);
	}

	/// Sends [`Event::Value`].
	pub fn send_value(&self, value: T) {
		self.send(Event::Value(value));
	}

	/// Sends [`Event::Failed`].
	pub fn send_failed(&self, error: E) {
		self.send(Event::Failed(error));
	}

	/// Sends [`Event::Completed`].
	pub fn send_completed(&self) {
		self.send(Event::Completed);
	}

	/// Sends [`Event::Interrupted`].
	pub fn send_interrupted(&self) {
		self.send(Event::Interrupted);
	}
}

/// A hot, multicast event stream.
///
/// Events are broadcast to all current observers in registration order, and serialised per
/// signal. Once terminated, a signal retains no observers. Observers that arrive later receive
/// [`Event::Completed`] immediately, whatever the original terminal event was.
pub struct Signal<T, E>(Arc<SignalCore<T, E>>);

impl<T, E> Clone for Signal<T, E> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T, E> Debug for Signal<T, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = self.0.state.lock();
		let mut debug = f.debug_struct("Signal");
		let debug = match &*state {
			SignalState::Alive { observers, .. } => debug.field("observers", &observers.len()),
			SignalState::Terminated => debug.field("terminated", &true),
		};
		debug.finish()
	}
}

struct SignalCore<T, E> {
	state: Mutex<SignalState<T, E>>,
	/// Serialises delivery. Re-entrant so that observers may send on the same thread.
	send_lock: ReentrantMutex<()>,
	/// Set once an interruption was asked for. Never reset.
	interrupting: AtomicBool,
	/// Set while an interruption waits for the delivering thread.
	interrupt_requested: AtomicBool,
	/// Disposed once the signal terminates.
	lifetime: Option<CompositeDisposable>,
}

enum SignalState<T, E> {
	Alive {
		observers: BTreeMap<u64, Arc<Registration<T, E>>>,
		next_key: u64,
	},
	Terminated,
}

struct Registration<T, E> {
	/// One of [`ACTIVE`], [`OWED_TERMINAL`] and [`INACTIVE`].
	status: AtomicU8,
	observer: Observer<T, E>,
}

const ACTIVE: u8 = 0;
/// Disposed while an interruption was pending: no more values, but the terminal event.
const OWED_TERMINAL: u8 = 1;
const INACTIVE: u8 = 2;

impl<T: Payload, E: Payload> Signal<T, E> {
	/// Creates a signal together with the observer that sends on it.
	#[must_use]
	pub fn pipe() -> (Self, Observer<T, E>) {
		Self::pipe_with(None)
	}

	/// Like [`pipe`](`Signal::pipe`), but disposes `lifetime` once the signal terminates.
	pub(crate) fn pipe_disposing(lifetime: CompositeDisposable) -> (Self, Observer<T, E>) {
		Self::pipe_with(Some(lifetime))
	}

	fn pipe_with(lifetime: Option<CompositeDisposable>) -> (Self, Observer<T, E>) {
		let core = Arc::new(SignalCore {
			state: Mutex::new(SignalState::Alive {
				observers: BTreeMap::new(),
				next_key: 0,
			}),
			send_lock: ReentrantMutex::new(()),
			interrupting: AtomicBool::new(false),
			interrupt_requested: AtomicBool::new(false),
			lifetime,
		});
		let input = {
			let core = Arc::clone(&core);
			Observer::new(move |event| core.send(event))
		};
		(Self(core), input)
	}

	/// Registers `observer`.
	///
	/// **Returns** a disposable that unregisters it. Once that disposal returns, `observer`
	/// receives no further values (except for a delivery already in progress on another thread).
	///
	/// If the signal's interruption is still waiting for another thread to finish delivering,
	/// the disposal leaves `observer` registered for that one [`Event::Interrupted`], so that
	/// operators upstream of a cancelled chain always see it terminate.
	pub fn observe(&self, observer: Observer<T, E>) -> ActionDisposable {
		let registration = {
			let mut state = self.0.state.lock();
			match &mut *state {
				SignalState::Alive {
					observers,
					next_key,
				} => {
					let key = *next_key;
					*next_key += 1;
					let registration = Arc::new(Registration {
						status: AtomicU8::new(ACTIVE),
						observer,
					});
					observers.insert(key, Arc::clone(&registration));
					Ok((key, registration))
				}
				SignalState::Terminated => Err(observer),
			}
		};

		match registration {
			Ok((key, registration)) => {
				let core = Arc::downgrade(&self.0);
				ActionDisposable::new(move || {
					let Some(core) = Weak::upgrade(&core) else {
						registration.status.store(INACTIVE, Ordering::Release);
						return;
					};
					if core.interrupting.load(Ordering::SeqCst) {
						// Fails harmlessly if the interruption was delivered already.
						let _ = registration.status.compare_exchange(
							ACTIVE,
							OWED_TERMINAL,
							Ordering::AcqRel,
							Ordering::Acquire,
						);
					} else {
						registration.status.store(INACTIVE, Ordering::Release);
						if let SignalState::Alive { observers, .. } = &mut *core.state.lock() {
							observers.remove(&key);
						}
					}
				})
			}
			Err(late) => {
				late.send_completed();
				ActionDisposable::empty()
			}
		}
	}

	/// Observes with a plain event handler.
	pub fn observe_with(
		&self,
		handler: impl 'static + Send + Sync + Fn(Event<T, E>),
	) -> ActionDisposable {
		self.observe(Observer::new(handler))
	}

	/// Observes values only.
	pub fn observe_values(&self, handler: impl 'static + Send + Sync + Fn(T)) -> ActionDisposable {
		self.observe_with(move |event| {
			if let Event::Value(value) = event {
				handler(value);
			}
		})
	}

	/// Whether the signal has terminated.
	#[must_use]
	pub fn is_terminated(&self) -> bool {
		matches!(*self.0.state.lock(), SignalState::Terminated)
	}

	/// Terminates the signal with [`Event::Interrupted`].
	///
	/// Never blocks: if another thread is delivering right now, that thread delivers
	/// the interruption once it's done.
	pub(crate) fn interrupt(&self) {
		self.0.interrupting.store(true, Ordering::SeqCst);
		self.0.interrupt_requested.store(true, Ordering::SeqCst);
		self.0.try_interrupt();
	}

	/// A disposable that [interrupts](`Signal::interrupt`) this signal.
	pub(crate) fn interrupter(&self) -> ActionDisposable {
		let signal = self.clone();
		ActionDisposable::new(move || signal.interrupt())
	}
}

impl<T: Payload, E: Payload> SignalCore<T, E> {
	fn send(&self, event: Event<T, E>) {
		if event.is_terminal() {
			let _send = self.send_lock.lock();
			self.terminate(event);
		} else {
			let send = self.send_lock.lock();
			let observers: Vec<_> = match &*self.state.lock() {
				SignalState::Alive { observers, .. } => observers.values().cloned().collect(),
				SignalState::Terminated => return,
			};
			for registration in observers {
				if registration.status.load(Ordering::Acquire) == ACTIVE {
					registration.observer.send(event.clone());
				}
			}
			drop(send);
		}
		self.try_interrupt();
	}

	fn try_interrupt(&self) {
		if !self.interrupt_requested.load(Ordering::SeqCst) {
			return;
		}
		if let Some(_send) = self.send_lock.try_lock() {
			if self.interrupt_requested.swap(false, Ordering::SeqCst) {
				self.terminate(Event::Interrupted);
			}
		}
	}

	/// Callers **must** hold `send_lock`.
	fn terminate(&self, event: Event<T, E>) {
		let observers = match mem::replace(&mut *self.state.lock(), SignalState::Terminated) {
			SignalState::Alive { observers, .. } => observers,
			SignalState::Terminated => return,
		};
		trace!("Signal terminated with {} observer(s).", observers.len());
		for registration in observers.into_values() {
			if registration.status.swap(INACTIVE, Ordering::AcqRel) != INACTIVE {
				registration.observer.send(event.clone());
			}
		}
		if let Some(lifetime) = &self.lifetime {
			lifetime.dispose();
		}
	}
}

impl<T, E> Drop for SignalCore<T, E> {
	fn drop(&mut self) {
		if let Some(lifetime) = &self.lifetime {
			lifetime.dispose();
		}
	}
}
