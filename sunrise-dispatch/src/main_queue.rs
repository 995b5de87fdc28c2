use std::{
	collections::VecDeque,
	fmt::{self, Debug, Formatter},
	panic::{catch_unwind, AssertUnwindSafe},
	sync::Arc,
	thread::{self, ThreadId},
};

use log::warn;
use parking_lot::Mutex;

use crate::Job;

/// The UI-confined serial domain.
///
/// Owned by the thread that created it. Work enqueued from any thread only runs when the
/// owner calls [`drain`](`MainQueue::drain`), which is how a presentation run loop pumps it.
#[derive(Clone)]
pub struct MainQueue(Arc<MainQueueInner>);

struct MainQueueInner {
	owner: ThreadId,
	pending: Mutex<VecDeque<Job>>,
}

impl Debug for MainQueue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MainQueue")
			.field("owner", &self.0.owner)
			.field("pending", &self.0.pending.lock().len())
			.finish()
	}
}

impl MainQueue {
	/// Creates a queue owned by the calling thread.
	#[must_use]
	pub fn for_current_thread() -> Self {
		Self(Arc::new(MainQueueInner {
			owner: thread::current().id(),
			pending: Mutex::new(VecDeque::new()),
		}))
	}

	/// Whether the calling thread owns this queue.
	#[must_use]
	pub fn is_main_thread(&self) -> bool {
		thread::current().id() == self.0.owner
	}

	/// Appends `job`. It runs during a later [`drain`](`MainQueue::drain`).
	pub fn enqueue(&self, job: impl 'static + Send + FnOnce()) {
		self.0.pending.lock().push_back(Box::new(job));
	}

	/// Whether any work is waiting.
	#[must_use]
	pub fn has_pending(&self) -> bool {
		!self.0.pending.lock().is_empty()
	}

	/// Runs queued jobs in order until the queue is empty, including jobs enqueued meanwhile.
	///
	/// **Returns** the number of jobs that ran.
	///
	/// Only the owner thread drains. Calls from any other thread run nothing and return `0`.
	pub fn drain(&self) -> usize {
		if !self.is_main_thread() {
			warn!("`MainQueue::drain` called off the main thread. Ignored.");
			return 0;
		}

		let mut ran = 0;
		while let Some(job) = {
			// The guard must not outlive the pop, or jobs couldn't enqueue.
			let next = self.0.pending.lock().pop_front();
			next
		} {
			if catch_unwind(AssertUnwindSafe(job)).is_err() {
				warn!("A job on the main queue panicked.");
			}
			ran += 1;
		}
		ran
	}
}
