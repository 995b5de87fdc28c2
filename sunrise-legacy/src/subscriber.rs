use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use parking_lot::ReentrantMutex;

use crate::{LegacyCompoundDisposable, LegacyDisposable, Object};

/// The receiving end of a legacy subscription.
///
/// After `error` or `completed`, and after disposal, nothing more is delivered.
/// Deliveries are serialised per subscriber, but a subscriber may be disposed from any thread
/// without waiting for an in-flight delivery.
#[derive(Clone)]
pub struct Subscriber(Arc<SubscriberInner>);

struct SubscriberInner {
	next: Box<dyn Send + Sync + Fn(Option<Object>)>,
	error: Box<dyn Send + Sync + Fn(Option<Object>)>,
	completed: Box<dyn Send + Sync + Fn()>,
	disposable: LegacyCompoundDisposable,
	serial: ReentrantMutex<()>,
}

impl Debug for Subscriber {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscriber")
			.field("disposed", &self.is_disposed())
			.finish_non_exhaustive()
	}
}

impl Subscriber {
	/// Creates a subscriber from its three callbacks.
	pub fn new(
		next: impl 'static + Send + Sync + Fn(Option<Object>),
		error: impl 'static + Send + Sync + Fn(Option<Object>),
		completed: impl 'static + Send + Sync + Fn(),
	) -> Self {
		Self(Arc::new(SubscriberInner {
			next: Box::new(next),
			error: Box::new(error),
			completed: Box::new(completed),
			disposable: LegacyCompoundDisposable::new(),
			serial: ReentrantMutex::new(()),
		}))
	}

	/// Delivers a value.
	pub fn send_next(&self, value: Option<Object>) {
		let _serial = self.0.serial.lock();
		if !self.is_disposed() {
			(self.0.next)(value);
		}
	}

	/// Delivers the terminal error, releasing the subscription first.
	pub fn send_error(&self, error: Option<Object>) {
		let _serial = self.0.serial.lock();
		if !self.is_disposed() {
			self.0.disposable.dispose();
			(self.0.error)(error);
		}
	}

	/// Delivers completion, releasing the subscription first.
	pub fn send_completed(&self) {
		let _serial = self.0.serial.lock();
		if !self.is_disposed() {
			self.0.disposable.dispose();
			(self.0.completed)();
		}
	}

	/// Ties `disposable` to this subscriber's lifetime.
	pub fn did_subscribe_with(&self, disposable: LegacyDisposable) {
		self.0.disposable.add(disposable);
	}

	/// Stops delivery and releases everything tied to this subscriber.
	pub fn dispose(&self) {
		self.0.disposable.dispose();
	}

	/// Whether the subscriber terminated or was disposed.
	#[must_use]
	pub fn is_disposed(&self) -> bool {
		self.0.disposable.is_disposed()
	}
}
