use std::{
	fmt::{self, Debug, Formatter},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Weak,
	},
};

use log::{debug, warn};
use parking_lot::{Mutex, ReentrantMutex};

use crate::{object, LegacyDisposable, LegacyError, LegacySignal, LegacySubject, Object};

type ExecutionBlock = dyn Send + Sync + Fn(Option<Object>) -> LegacySignal;

/// Gates an execution block behind an `enabled` signal.
///
/// Unless [concurrent execution](`LegacyCommand::set_allows_concurrent_execution`) is allowed,
/// the command also disables itself while an execution is in flight.
#[derive(Clone)]
pub struct LegacyCommand(Arc<CommandInner>);

struct CommandInner {
	block: Box<ExecutionBlock>,
	/// Orders publication on the state subjects.
	publish: ReentrantMutex<()>,
	state: Mutex<CommandState>,
	enabled: LegacySubject,
	executing: LegacySubject,
	execution_signals: LegacySubject,
	errors: LegacySubject,
	enabled_input: Mutex<Option<LegacyDisposable>>,
}

#[derive(Debug)]
struct CommandState {
	input_enabled: bool,
	executing: usize,
	allows_concurrent_execution: bool,
	published_enabled: bool,
	published_executing: bool,
}

impl CommandState {
	fn is_enabled(&self) -> bool {
		self.input_enabled && (self.allows_concurrent_execution || self.executing == 0)
	}
}

impl Debug for LegacyCommand {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LegacyCommand")
			.field("state", &*self.0.state.lock())
			.finish_non_exhaustive()
	}
}

impl LegacyCommand {
	/// Creates an always-enabled command.
	pub fn new(block: impl 'static + Send + Sync + Fn(Option<Object>) -> LegacySignal) -> Self {
		Self::with_inner(block)
	}

	/// Creates a command that is enabled while the latest value of `enabled` is `true`.
	///
	/// The command starts out enabled. Values that aren't [`bool`] count as `false`.
	pub fn with_enabled(
		enabled: &LegacySignal,
		block: impl 'static + Send + Sync + Fn(Option<Object>) -> LegacySignal,
	) -> Self {
		let this = Self::with_inner(block);
		let inner = Arc::downgrade(&this.0);
		let subscription = enabled.subscribe_values(move |value| {
			let Some(inner) = Weak::upgrade(&inner) else {
				return;
			};
			let enabled = match value.as_ref().map(|value| value.downcast_ref::<bool>()) {
				Some(Some(&enabled)) => enabled,
				_ => {
					warn!("Non-boolean value on a legacy command's enabled signal. Treating it as `false`.");
					false
				}
			};
			inner.transition(|state| state.input_enabled = enabled);
		});
		*this.0.enabled_input.lock() = Some(subscription);
		this
	}

	fn with_inner(block: impl 'static + Send + Sync + Fn(Option<Object>) -> LegacySignal) -> Self {
		Self(Arc::new(CommandInner {
			block: Box::new(block),
			publish: ReentrantMutex::new(()),
			state: Mutex::new(CommandState {
				input_enabled: true,
				executing: 0,
				allows_concurrent_execution: false,
				published_enabled: true,
				published_executing: false,
			}),
			enabled: LegacySubject::behavior(Some(object(true))),
			executing: LegacySubject::behavior(Some(object(false))),
			execution_signals: LegacySubject::new(),
			errors: LegacySubject::new(),
			enabled_input: Mutex::new(None),
		}))
	}

	/// Sends the current enabled state, then every change of it, as [`bool`]s.
	#[must_use]
	pub fn enabled(&self) -> LegacySignal {
		self.0.enabled.signal()
	}

	/// Sends the current executing state, then every change of it, as [`bool`]s.
	#[must_use]
	pub fn executing(&self) -> LegacySignal {
		self.0.executing.signal()
	}

	/// Sends each execution's result signal (as [`LegacySignal`] [`Object`]s) as it starts.
	#[must_use]
	pub fn execution_signals(&self) -> LegacySignal {
		self.0.execution_signals.signal()
	}

	/// Sends the error of each failed execution.
	#[must_use]
	pub fn errors(&self) -> LegacySignal {
		self.0.errors.signal()
	}

	/// Whether [`execute`](`LegacyCommand::execute`) would currently run the block.
	#[must_use]
	pub fn is_enabled(&self) -> bool {
		self.0.state.lock().is_enabled()
	}

	/// Whether an execution is in flight.
	#[must_use]
	pub fn is_executing(&self) -> bool {
		self.0.state.lock().executing > 0
	}

	/// Whether [`execute`](`LegacyCommand::execute`) may overlap. Defaults to `false`.
	pub fn set_allows_concurrent_execution(&self, allows: bool) {
		self.0
			.transition(|state| state.allows_concurrent_execution = allows);
	}

	/// Runs the execution block with `input`, eagerly.
	///
	/// **Returns** a signal that replays the execution's events to each subscriber,
	/// or fails with [`LegacyError::command_not_enabled`] iff the command is disabled.
	pub fn execute(&self, input: Option<Object>) -> LegacySignal {
		let started = self.0.transition(|state| {
			let enabled = state.is_enabled();
			if enabled {
				state.executing += 1;
			}
			enabled
		});
		if !started {
			debug!("Rejected execution of a disabled legacy command.");
			return LegacySignal::error(Some(object(LegacyError::command_not_enabled())));
		}

		let results = LegacySubject::replay();
		self.0
			.execution_signals
			.send_next(Some(object(results.signal())));

		let finished = Arc::new(AtomicBool::new(false));
		let finish = {
			let inner = Arc::downgrade(&self.0);
			move || {
				if !finished.swap(true, Ordering::AcqRel) {
					if let Some(inner) = inner.upgrade() {
						inner.transition(|state| state.executing -= 1);
					}
				}
			}
		};

		let signal = (self.0.block)(input);
		let (on_error, on_completed) = (finish.clone(), finish);
		let (next, error, completed) = (results.clone(), results.clone(), results.clone());
		let errors = self.0.errors.clone();
		// The execution runs to its end regardless of subscribers.
		let _ = signal.subscribe_next(
			move |value| next.send_next(value),
			move |e| {
				on_error();
				errors.send_next(e.clone());
				error.send_error(e);
			},
			move || {
				on_completed();
				completed.send_completed();
			},
		);

		results.signal()
	}
}

impl CommandInner {
	fn transition<R>(&self, f: impl FnOnce(&mut CommandState) -> R) -> R {
		let _publish = self.publish.lock();
		let (r, enabled, executing) = {
			let mut state = self.state.lock();
			let r = f(&mut state);
			let enabled = state.is_enabled();
			let executing = state.executing > 0;
			let enabled = (enabled != state.published_enabled).then(|| {
				state.published_enabled = enabled;
				enabled
			});
			let executing = (executing != state.published_executing).then(|| {
				state.published_executing = executing;
				executing
			});
			(r, enabled, executing)
		};
		if let Some(executing) = executing {
			self.executing.send_next(Some(object(executing)));
		}
		if let Some(enabled) = enabled {
			self.enabled.send_next(Some(object(enabled)));
		}
		r
	}
}

impl Drop for CommandInner {
	fn drop(&mut self) {
		if let Some(input) = self.enabled_input.get_mut().take() {
			input.dispose();
		}
		self.enabled.send_completed();
		self.executing.send_completed();
		self.execution_signals.send_completed();
		self.errors.send_completed();
	}
}
