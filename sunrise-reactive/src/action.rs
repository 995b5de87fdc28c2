use std::{
	fmt::{self, Debug, Formatter},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Weak,
	},
};

use log::debug;
use parking_lot::{Mutex, ReentrantMutex};
use scopeguard::ScopeGuard;

use crate::{
	ConstantProperty, Disposable, Event, MutableProperty, NoError, Observer, Payload, Property,
	ReadOnlyProperty, SerialDisposable, Signal, SignalProducer,
};

/// Why an [`Action`] execution failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError<E> {
	/// The action was disabled when the execution was started.
	#[error("the action is disabled")]
	NotEnabled,
	/// The execution's producer failed.
	#[error("{0}")]
	UpstreamFailed(E),
}

/// Whether executions of one [`Action`] may overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
	/// At most one execution at a time. The action is disabled while it runs.
	#[default]
	Serial,
	/// Any number of executions. Only the condition gates the action.
	Unbounded,
}

/// A gated factory of asynchronous operations.
///
/// The action is enabled while its condition holds and, with [`Concurrency::Serial`],
/// no execution is in flight. Checking that and counting an execution as started is atomic.
pub struct Action<I, O, E>(Arc<ActionCore<I, O, E>>);

type Execute<I, O, E> = dyn Send + Sync + Fn(I) -> SignalProducer<O, E>;

struct ActionCore<I, O, E> {
	execute: Box<Execute<I, O, E>>,
	concurrency: Concurrency,
	state: Mutex<ActionState>,
	/// Orders publication of state changes. Taken before the properties' update locks.
	publish_lock: ReentrantMutex<()>,
	is_enabled: MutableProperty<bool>,
	is_executing: MutableProperty<bool>,
	values: (Signal<O, NoError>, Observer<O, NoError>),
	errors: (Signal<E, NoError>, Observer<E, NoError>),
	condition: SerialDisposable,
	condition_source: Box<dyn Property<bool>>,
}

#[derive(Debug)]
struct ActionState {
	condition: bool,
	executing: usize,
}

impl ActionState {
	fn is_enabled(&self, concurrency: Concurrency) -> bool {
		self.condition && (concurrency == Concurrency::Unbounded || self.executing == 0)
	}
}

impl<I, O, E> Clone for Action<I, O, E> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<I, O, E> Debug for Action<I, O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Action")
			.field("concurrency", &self.0.concurrency)
			.field("state", &*self.0.state.lock())
			.finish_non_exhaustive()
	}
}

impl<I: Payload, O: Payload, E: Payload> Action<I, O, E> {
	/// Creates an action that is only gated by its own executions.
	pub fn new(execute: impl 'static + Send + Sync + Fn(I) -> SignalProducer<O, E>) -> Self {
		Self::enabled_if(ConstantProperty::new(true), execute)
	}

	/// Creates a [serial](`Concurrency::Serial`) action gated by `condition`.
	pub fn enabled_if(
		condition: impl 'static + Property<bool>,
		execute: impl 'static + Send + Sync + Fn(I) -> SignalProducer<O, E>,
	) -> Self {
		Self::enabled_if_with(condition, Concurrency::Serial, execute)
	}

	/// Creates an action gated by `condition`, with the given [`Concurrency`].
	pub fn enabled_if_with(
		condition: impl 'static + Property<bool>,
		concurrency: Concurrency,
		execute: impl 'static + Send + Sync + Fn(I) -> SignalProducer<O, E>,
	) -> Self {
		let initial = condition.value();
		let core = Arc::new(ActionCore {
			execute: Box::new(execute),
			concurrency,
			state: Mutex::new(ActionState {
				condition: initial,
				executing: 0,
			}),
			publish_lock: ReentrantMutex::new(()),
			is_enabled: MutableProperty::new(initial),
			is_executing: MutableProperty::new(false),
			values: Signal::pipe(),
			errors: Signal::pipe(),
			condition: SerialDisposable::new(),
			condition_source: Box::new(condition),
		});

		let weak = Arc::downgrade(&core);
		let subscription = core
			.condition_source
			.producer()
			.start_with_values(move |condition| {
				if let Some(core) = Weak::upgrade(&weak) {
					core.transition(|state| state.condition = condition);
				}
			});
		core.condition.replace(subscription);

		Self(core)
	}

	/// Whether [`apply`](`Action::apply`) would currently start an execution.
	#[must_use]
	pub fn is_enabled(&self) -> ReadOnlyProperty<bool> {
		self.0.is_enabled.read_only()
	}

	/// Whether an execution is in flight.
	#[must_use]
	pub fn is_executing(&self) -> ReadOnlyProperty<bool> {
		self.0.is_executing.read_only()
	}

	/// The values of all executions.
	#[must_use]
	pub fn values(&self) -> Signal<O, NoError> {
		self.0.values.0.clone()
	}

	/// The errors of all failed executions.
	#[must_use]
	pub fn errors(&self) -> Signal<E, NoError> {
		self.0.errors.0.clone()
	}

	/// A cold producer that executes the action with `input` each time it is started.
	///
	/// A start while the action is disabled fails with [`ActionError::NotEnabled`] before
	/// [`start`](`SignalProducer::start`) returns, without calling the factory.
	/// Otherwise, the execution counts as in flight until it terminates or is disposed.
	pub fn apply(&self, input: I) -> SignalProducer<O, ActionError<E>> {
		let core = Arc::clone(&self.0);
		SignalProducer::new(move |observer: Observer<O, ActionError<E>>, lifetime| {
			let started = core.transition(|state| {
				let enabled = state.is_enabled(core.concurrency);
				if enabled {
					state.executing += 1;
				}
				enabled
			});
			if !started {
				debug!("Action is disabled. Rejecting execution.");
				observer.send_failed(ActionError::NotEnabled);
				return;
			}
			debug!("Action execution started.");

			let finished = Arc::new(AtomicBool::new(false));
			let finish = {
				let core = Arc::clone(&core);
				move || {
					if !finished.swap(true, Ordering::AcqRel) {
						core.transition(|state| state.executing -= 1);
						debug!("Action execution finished.");
					}
				}
			};
			// Undoes the start if the factory or the start panics.
			let guard = scopeguard::guard(finish.clone(), |finish| finish());

			let producer = (core.execute)(input.clone());
			lifetime.add_action(finish.clone());
			let (values, errors) = (core.values.1.clone(), core.errors.1.clone());
			lifetime.add(producer.start_with(move |event| match event {
				Event::Value(value) => {
					values.send_value(value.clone());
					observer.send_value(value);
				}
				Event::Failed(error) => {
					finish();
					errors.send_value(error.clone());
					observer.send_failed(ActionError::UpstreamFailed(error));
				}
				Event::Completed => {
					finish();
					observer.send_completed();
				}
				Event::Interrupted => {
					finish();
					observer.send_interrupted();
				}
			}));

			let _ = ScopeGuard::into_inner(guard);
		})
	}
}

impl<I, O, E> ActionCore<I, O, E> {
	fn transition<R>(&self, f: impl FnOnce(&mut ActionState) -> R) -> R {
		let _publish = self.publish_lock.lock();
		let (r, enabled, executing) = {
			let mut state = self.state.lock();
			let r = f(&mut state);
			(r, state.is_enabled(self.concurrency), state.executing > 0)
		};
		if self.is_executing.value() != executing {
			self.is_executing.set(executing);
		}
		if self.is_enabled.value() != enabled {
			self.is_enabled.set(enabled);
		}
		r
	}
}

impl<I, O, E> Drop for ActionCore<I, O, E> {
	fn drop(&mut self) {
		self.condition.dispose();
		self.values.1.send_completed();
		self.errors.1.send_completed();
	}
}
