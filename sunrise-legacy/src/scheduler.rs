use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use sunrise_dispatch::{MainQueue, SerialQueue};

use crate::LegacyDisposable;

/// Where legacy work runs.
#[derive(Clone)]
pub struct LegacyScheduler {
	name: Arc<str>,
	target: Target,
}

#[derive(Clone)]
enum Target {
	Immediate,
	MainThread(MainQueue),
	Queue(SerialQueue),
}

impl Debug for LegacyScheduler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LegacyScheduler")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

impl LegacyScheduler {
	/// Runs blocks synchronously on the calling thread.
	#[must_use]
	pub fn immediate() -> Self {
		Self {
			name: "sunrise.legacy.immediate".into(),
			target: Target::Immediate,
		}
	}

	/// Enqueues blocks onto `queue`, always asynchronously.
	#[must_use]
	pub fn main_thread(queue: MainQueue) -> Self {
		Self {
			name: "sunrise.legacy.main-thread".into(),
			target: Target::MainThread(queue),
		}
	}

	/// Dispatches blocks onto `queue`, in submission order.
	pub fn target_queue(name: impl Into<Arc<str>>, queue: SerialQueue) -> Self {
		Self {
			name: name.into(),
			target: Target::Queue(queue),
		}
	}

	/// Diagnostic name.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Whether this is an [`immediate`](`LegacyScheduler::immediate`) scheduler.
	#[must_use]
	pub fn is_immediate(&self) -> bool {
		matches!(self.target, Target::Immediate)
	}

	/// The main queue behind a [`main_thread`](`LegacyScheduler::main_thread`) scheduler.
	#[must_use]
	pub fn main_queue(&self) -> Option<&MainQueue> {
		match &self.target {
			Target::MainThread(queue) => Some(queue),
			_ => None,
		}
	}

	/// The queue behind a [`target_queue`](`LegacyScheduler::target_queue`) scheduler.
	#[must_use]
	pub fn serial_queue(&self) -> Option<&SerialQueue> {
		match &self.target {
			Target::Queue(queue) => Some(queue),
			_ => None,
		}
	}

	/// Schedules `block`.
	///
	/// **Returns** a disposable that cancels `block` if it hasn't started yet,
	/// or [`None`] iff `block` already ran.
	pub fn schedule(&self, block: impl 'static + Send + FnOnce()) -> Option<LegacyDisposable> {
		let cancel = LegacyDisposable::empty();
		let job = {
			let cancel = cancel.clone();
			move || {
				if !cancel.is_disposed() {
					block();
				}
			}
		};
		match &self.target {
			Target::Immediate => {
				job();
				return None;
			}
			Target::MainThread(queue) => queue.enqueue(job),
			Target::Queue(queue) => queue.dispatch(job),
		}
		Some(cancel)
	}
}
