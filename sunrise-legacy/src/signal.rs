use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use log::trace;

use crate::{LegacyDisposable, LegacyScheduler, Object, Subscriber};

type DidSubscribe = dyn Send + Sync + Fn(Subscriber) -> Option<LegacyDisposable>;

/// A cold legacy signal: every subscription runs the subscription block anew.
#[derive(Clone)]
pub struct LegacySignal(Arc<DidSubscribe>);

impl Debug for LegacySignal {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LegacySignal").finish_non_exhaustive()
	}
}

impl LegacySignal {
	/// Creates a signal from its subscription block.
	///
	/// The block's returned disposable, if any, is disposed along with the subscriber.
	pub fn create(
		did_subscribe: impl 'static + Send + Sync + Fn(Subscriber) -> Option<LegacyDisposable>,
	) -> Self {
		Self(Arc::new(did_subscribe))
	}

	/// Runs the subscription block for `subscriber`.
	///
	/// **Returns** a disposable that disposes `subscriber`.
	pub fn subscribe(&self, subscriber: Subscriber) -> LegacyDisposable {
		trace!("Legacy signal subscribed.");
		if let Some(disposable) = (self.0)(subscriber.clone()) {
			subscriber.did_subscribe_with(disposable);
		}
		LegacyDisposable::new(move || subscriber.dispose())
	}

	/// Subscribes with the three callbacks of a [`Subscriber`].
	pub fn subscribe_next(
		&self,
		next: impl 'static + Send + Sync + Fn(Option<Object>),
		error: impl 'static + Send + Sync + Fn(Option<Object>),
		completed: impl 'static + Send + Sync + Fn(),
	) -> LegacyDisposable {
		self.subscribe(Subscriber::new(next, error, completed))
	}

	/// Subscribes to values only.
	pub fn subscribe_values(
		&self,
		next: impl 'static + Send + Sync + Fn(Option<Object>),
	) -> LegacyDisposable {
		self.subscribe_next(next, |_| (), || ())
	}

	/// Sends `value`, then completes.
	#[must_use]
	pub fn return_value(value: Option<Object>) -> Self {
		Self::from_values([value])
	}

	/// Sends each of `values` in order, then completes.
	pub fn from_values(values: impl IntoIterator<Item = Option<Object>>) -> Self {
		let values: Vec<_> = values.into_iter().collect();
		Self::create(move |subscriber| {
			for value in &values {
				subscriber.send_next(value.clone());
			}
			subscriber.send_completed();
			None
		})
	}

	/// Fails immediately with `error`.
	#[must_use]
	pub fn error(error: Option<Object>) -> Self {
		Self::create(move |subscriber| {
			subscriber.send_error(error.clone());
			None
		})
	}

	/// Completes immediately.
	#[must_use]
	pub fn empty() -> Self {
		Self::create(|subscriber| {
			subscriber.send_completed();
			None
		})
	}

	/// Never sends anything.
	#[must_use]
	pub fn never() -> Self {
		Self::create(|_| None)
	}

	/// Calls `factory` on each subscription and subscribes to the signal it returns.
	pub fn defer(factory: impl 'static + Send + Sync + Fn() -> LegacySignal) -> Self {
		Self::create(move |subscriber| {
			// `subscribe` already ties the inner subscription to `subscriber`.
			let _ = factory().subscribe(subscriber);
			None
		})
	}

	/// Forwards every event through `scheduler`.
	#[must_use]
	pub fn deliver_on(&self, scheduler: LegacyScheduler) -> Self {
		let source = self.clone();
		Self::create(move |subscriber| {
			let (next, error, completed) = (subscriber.clone(), subscriber.clone(), subscriber);
			let (next_on, error_on, completed_on) =
				(scheduler.clone(), scheduler.clone(), scheduler.clone());
			Some(source.subscribe_next(
				move |value| {
					let next = next.clone();
					let _ = next_on.schedule(move || next.send_next(value));
				},
				move |e| {
					let error = error.clone();
					let _ = error_on.schedule(move || error.send_error(e));
				},
				move || {
					let completed = completed.clone();
					let _ = completed_on.schedule(move || completed.send_completed());
				},
			))
		})
	}
}
