use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use sunrise_dispatch::{Job, MainQueue, SerialQueue};

use crate::{ActionDisposable, Disposable};

/// An execution context for [`Job`]s.
pub trait Scheduler: Send + Sync {
	/// Runs `job` in this context, now or later.
	///
	/// **Returns** a disposable that cancels `job` iff it didn't start yet,
	/// or [`None`] iff `job` already ran to completion.
	fn schedule(&self, job: Job) -> Option<ActionDisposable>;
}

impl<S: ?Sized + Scheduler> Scheduler for Arc<S> {
	fn schedule(&self, job: Job) -> Option<ActionDisposable> {
		(**self).schedule(job)
	}
}

fn cancellable(job: Job) -> (ActionDisposable, impl 'static + Send + FnOnce()) {
	let cancel = ActionDisposable::empty();
	let guarded = {
		let cancel = cancel.clone();
		move || {
			if !cancel.is_disposed() {
				job();
			}
		}
	};
	(cancel, guarded)
}

/// Runs jobs synchronously on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
	fn schedule(&self, job: Job) -> Option<ActionDisposable> {
		job();
		None
	}
}

/// Runs jobs in the UI-confined domain of a [`MainQueue`].
///
/// Jobs scheduled on the main thread while nothing is queued run synchronously.
/// Everything else is enqueued, so order is preserved either way.
#[derive(Debug, Clone)]
pub struct UiScheduler(MainQueue);

impl UiScheduler {
	/// Creates a scheduler targeting `queue`.
	#[must_use]
	pub fn new(queue: MainQueue) -> Self {
		Self(queue)
	}

	/// The queue this scheduler targets.
	#[must_use]
	pub fn main_queue(&self) -> &MainQueue {
		&self.0
	}
}

impl Scheduler for UiScheduler {
	fn schedule(&self, job: Job) -> Option<ActionDisposable> {
		if self.0.is_main_thread() && !self.0.has_pending() {
			job();
			return None;
		}
		let (cancel, job) = cancellable(job);
		self.0.enqueue(job);
		Some(cancel)
	}
}

/// Runs jobs on a [`SerialQueue`], in submission order.
#[derive(Clone)]
pub struct QueueScheduler(SerialQueue);

impl Debug for QueueScheduler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("QueueScheduler").field(&self.0.label()).finish()
	}
}

impl QueueScheduler {
	/// Creates a scheduler with a fresh [`SerialQueue`] labelled `label`.
	///
	/// # Panics
	///
	/// Iff the queue's worker thread can't be spawned.
	pub fn new(label: impl Into<Arc<str>>) -> Self {
		Self(SerialQueue::new(label))
	}

	/// Creates a scheduler that shares `queue`.
	#[must_use]
	pub fn with_queue(queue: SerialQueue) -> Self {
		Self(queue)
	}

	/// The queue this scheduler targets.
	#[must_use]
	pub fn queue(&self) -> &SerialQueue {
		&self.0
	}
}

impl Scheduler for QueueScheduler {
	fn schedule(&self, job: Job) -> Option<ActionDisposable> {
		let (cancel, job) = cancellable(job);
		self.0.dispatch(job);
		Some(cancel)
	}
}
