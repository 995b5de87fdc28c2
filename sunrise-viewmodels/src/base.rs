use std::fmt::Display;

use log::{debug, trace};
use sunrise_reactive::{
	CompositeDisposable, Disposable, MutableProperty, NoError, Observer, Payload, Property,
	SerialDisposable, Signal, SignalProducer,
};

/// State shared by all view models: the activation flag, a lifetime for bindings and
/// the alert messages meant for the user.
///
/// Dropping it disposes everything added to its [`lifetime`](`ViewModelBase::lifetime`),
/// then completes [`alert_messages`](`ViewModelBase::alert_messages`).
#[derive(Debug)]
pub struct ViewModelBase {
	is_active: MutableProperty<bool>,
	lifetime: CompositeDisposable,
	alerts: (Signal<String, NoError>, Observer<String, NoError>),
}

impl Default for ViewModelBase {
	fn default() -> Self {
		Self::new()
	}
}

impl ViewModelBase {
	/// Creates an inactive base.
	#[must_use]
	pub fn new() -> Self {
		Self {
			is_active: MutableProperty::new(false),
			lifetime: CompositeDisposable::new(),
			alerts: Signal::pipe(),
		}
	}

	/// Whether the view model's screen is on display. Set by the presentation layer.
	#[must_use]
	pub fn is_active(&self) -> &MutableProperty<bool> {
		&self.is_active
	}

	/// Disposed when the view model goes away.
	#[must_use]
	pub fn lifetime(&self) -> &CompositeDisposable {
		&self.lifetime
	}

	/// Messages to show the user, typically in an alert. One per failed request.
	#[must_use]
	pub fn alert_messages(&self) -> Signal<String, NoError> {
		self.alerts.0.clone()
	}

	/// Sends `message` on [`alert_messages`](`ViewModelBase::alert_messages`).
	pub fn send_alert_message(&self, message: impl Into<String>) {
		self.alerts.1.send_value(message.into());
	}

	/// Sends each of `errors` on [`alert_messages`](`ViewModelBase::alert_messages`), in its
	/// [`Display`] form, for as long as the view model lives.
	pub fn alert_on<E: Payload + Display>(&self, errors: &Signal<E, NoError>) {
		let alerts = self.alerts.1.clone();
		self.lifetime.add(errors.observe_values(move |error| {
			debug!("Alerting: {error}");
			alerts.send_value(error.to_string());
		}));
	}

	/// Sends `()` whenever [`is_active`](`ViewModelBase::is_active`) becomes `true`,
	/// including right away iff it is `true` already.
	#[must_use]
	pub fn did_become_active(&self) -> SignalProducer<(), NoError> {
		self.is_active
			.producer()
			.skip_repeats()
			.filter(|active| *active)
			.map(|_| ())
	}

	/// Sends `()` whenever [`is_active`](`ViewModelBase::is_active`) becomes `false`,
	/// including right away iff it is `false` already.
	#[must_use]
	pub fn did_become_inactive(&self) -> SignalProducer<(), NoError> {
		self.is_active
			.producer()
			.skip_repeats()
			.filter(|active| !*active)
			.map(|_| ())
	}

	/// Starts the producer `work` returns each time the view model becomes active,
	/// and disposes that run when it becomes inactive.
	pub fn run_while_active<T: Payload, E: Payload>(
		&self,
		work: impl 'static + Send + Sync + Fn() -> SignalProducer<T, E>,
	) {
		let run = SerialDisposable::new();
		self.lifetime.add(run.clone());
		self.lifetime.add(
			self.is_active
				.producer()
				.skip_repeats()
				.start_with_values(move |active| {
					if active {
						trace!("View model became active. Starting work.");
						run.replace(work().start_with(|_| ()));
					} else {
						trace!("View model became inactive. Disposing work.");
						run.clear();
					}
				}),
		);
	}
}

impl Drop for ViewModelBase {
	fn drop(&mut self) {
		self.lifetime.dispose();
		self.alerts.1.send_completed();
	}
}

/// Implemented by every view model.
pub trait ViewModel {
	/// The shared state.
	fn base(&self) -> &ViewModelBase;

	/// Shorthand for [`ViewModelBase::is_active`].
	fn is_active(&self) -> &MutableProperty<bool> {
		self.base().is_active()
	}
}
