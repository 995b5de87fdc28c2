use std::{
	fmt::{self, Debug, Formatter},
	future::Future,
	panic::{catch_unwind, AssertUnwindSafe},
	sync::Arc,
	thread::{self, ThreadId},
};

use futures_channel::{
	mpsc::{self, UnboundedSender},
	oneshot,
};
use futures_lite::{future, StreamExt as _};
use log::{trace, warn};

use crate::Job;

/// A FIFO queue backed by its own worker thread.
///
/// Clones refer to the same queue. The worker exits once the last handle is dropped
/// and every job submitted before that has run.
#[derive(Clone)]
pub struct SerialQueue(Arc<QueueHandle>);

struct QueueHandle {
	label: Arc<str>,
	sender: UnboundedSender<Job>,
	worker: ThreadId,
}

impl Debug for SerialQueue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SerialQueue")
			.field("label", &self.0.label)
			.finish_non_exhaustive()
	}
}

impl SerialQueue {
	/// Spawns a new worker thread named after `label`.
	///
	/// # Panics
	///
	/// Iff the operating system refuses to spawn the worker thread,
	/// like [`std::thread::spawn`] does.
	pub fn new(label: impl Into<Arc<str>>) -> Self {
		let label: Arc<str> = label.into();
		let (sender, mut receiver) = mpsc::unbounded::<Job>();
		let worker = thread::Builder::new()
			.name(label.to_string())
			.spawn({
				let label = Arc::clone(&label);
				move || {
					trace!("Serial queue {label:?} started.");
					future::block_on(async {
						while let Some(job) = receiver.next().await {
							if catch_unwind(AssertUnwindSafe(job)).is_err() {
								warn!("A job on serial queue {label:?} panicked.");
							}
						}
					});
					trace!("Serial queue {label:?} stopped.");
				}
			})
			.expect("failed to spawn a serial queue worker thread");

		Self(Arc::new(QueueHandle {
			label,
			sender,
			worker: worker.thread().id(),
		}))
	}

	/// The label this queue was created with. Also the name of its worker thread.
	#[must_use]
	pub fn label(&self) -> &str {
		&self.0.label
	}

	/// Submits `job` to run after everything submitted before it.
	pub fn dispatch(&self, job: impl 'static + Send + FnOnce()) {
		if self.0.sender.unbounded_send(Box::new(job)).is_err() {
			warn!(
				"Serial queue {:?} is gone. The job was dropped without running.",
				self.0.label
			);
		}
	}

	/// Whether the calling thread is this queue's worker.
	#[must_use]
	pub fn is_current(&self) -> bool {
		thread::current().id() == self.0.worker
	}

	/// Resolves once every job submitted before this call has run.
	///
	/// Resolves immediately iff the worker is gone.
	pub fn barrier(&self) -> impl 'static + Send + Future<Output = ()> {
		let (sender, receiver) = oneshot::channel();
		self.dispatch(move || {
			sender.send(()).ok();
		});
		async move {
			receiver.await.ok();
		}
	}

	/// Whether `self` and `other` refer to the same queue.
	#[must_use]
	pub fn same_queue(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}
