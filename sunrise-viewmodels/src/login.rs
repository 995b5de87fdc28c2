use std::sync::Arc;

use log::{debug, info};
use sunrise_reactive::{
	shadow_clone, Action, Event, MutableProperty, NoError, Observer, Property, ReadOnlyProperty,
	SignalProducer,
};

use crate::{AuthError, AuthService, KeyValueStore, SignupProfile, ViewModel, ViewModelBase};

/// Key under which the last logged-in username is persisted.
pub const LOGGED_IN_USERNAME_KEY: &str = "LoggedInUsername";

/// Log-in and sign-up screen.
pub struct LoginViewModel {
	base: ViewModelBase,

	// Inputs
	username: MutableProperty<String>,
	password: MutableProperty<String>,
	title: MutableProperty<String>,
	first_name: MutableProperty<String>,
	last_name: MutableProperty<String>,
	email: MutableProperty<String>,
	registration_password: MutableProperty<String>,
	registration_password_confirmation: MutableProperty<String>,

	// Outputs
	is_login_input_valid: MutableProperty<bool>,
	is_signup_input_valid: MutableProperty<bool>,
	session: Session,

	// Actions
	login_action: Action<(), (), AuthError>,
	signup_action: Action<(), (), AuthError>,
}

/// What the actions' producers need, detached from the view model itself.
#[derive(Clone)]
struct Session {
	auth: Arc<dyn AuthService>,
	settings: Arc<dyn KeyValueStore>,
	is_logged_in: MutableProperty<bool>,
	is_loading: MutableProperty<bool>,
}

impl Session {
	fn login_user(&self, username: String, password: String) -> SignalProducer<(), AuthError> {
		let session = self.clone();
		SignalProducer::new(move |observer: Observer<(), AuthError>, _| {
			debug!("Logging in.");
			session.auth.login(
				&username,
				&password,
				Box::new({
					shadow_clone!(session, username);
					move |result: Result<(), AuthError>| {
						session.is_loading.set(false);
						match result {
							Ok(()) => {
								info!("Logged in.");
								session.settings.set_string(LOGGED_IN_USERNAME_KEY, username);
								session.is_logged_in.set(true);
								observer.send_completed();
							}
							Err(error) => {
								debug!("Login failed: {error}");
								observer.send_failed(error);
							}
						}
					}
				}),
			);
		})
	}

	fn register_user(&self, profile: SignupProfile) -> SignalProducer<(), AuthError> {
		let session = self.clone();
		SignalProducer::new(move |observer: Observer<(), AuthError>, lifetime| {
			debug!("Signing up.");
			session.auth.sign_up(
				&profile,
				Box::new({
					shadow_clone!(session, profile, lifetime);
					move |result: Result<(), AuthError>| match result {
						Ok(()) => {
							let login = session.login_user(profile.email, profile.password);
							lifetime.add(login.start_with(move |event| match event {
								Event::Value(()) => (),
								Event::Failed(error) => observer.send_failed(error),
								Event::Completed | Event::Interrupted => observer.send_completed(),
							}));
						}
						Err(error) => {
							debug!("Sign-up failed: {error}");
							session.is_loading.set(false);
							observer.send_failed(error);
						}
					}
				}),
			);
		})
	}
}

fn non_empty(property: &MutableProperty<String>) -> SignalProducer<bool, NoError> {
	property.producer().map(|text| !text.is_empty())
}

fn both(
	left: &SignalProducer<bool, NoError>,
	right: &SignalProducer<bool, NoError>,
) -> SignalProducer<bool, NoError> {
	left.combine_latest(right).map(|(left, right)| left && right)
}

impl LoginViewModel {
	/// Creates the view model. The username of successful logins is persisted to `settings`.
	pub fn new(auth: Arc<dyn AuthService>, settings: Arc<dyn KeyValueStore>) -> Self {
		let base = ViewModelBase::new();
		let input = || MutableProperty::new(String::new());
		let (username, password, title, first_name, last_name, email) =
			(input(), input(), input(), input(), input(), input());
		let (registration_password, registration_password_confirmation) = (input(), input());

		let session = Session {
			is_logged_in: MutableProperty::new(auth.is_logged_in()),
			is_loading: MutableProperty::new(false),
			auth,
			settings,
		};

		let is_login_input_valid = MutableProperty::new(false);
		base.lifetime().add(
			is_login_input_valid.bind(&both(&non_empty(&username), &non_empty(&password))),
		);

		let is_signup_input_valid = MutableProperty::new(false);
		let filled = [&title, &first_name, &last_name, &email]
			.into_iter()
			.fold(SignalProducer::value(true), |all, field| {
				both(&all, &non_empty(field))
			});
		let passwords_match = registration_password
			.producer()
			.combine_latest(&registration_password_confirmation.producer())
			.map(|(password, confirmation)| !password.is_empty() && password == confirmation);
		base.lifetime()
			.add(is_signup_input_valid.bind(&both(&filled, &passwords_match)));

		let login_action = Action::enabled_if(is_login_input_valid.read_only(), {
			shadow_clone!(session, username, password);
			move |()| {
				session.is_loading.set(true);
				session.login_user(username.value(), password.value())
			}
		});

		let signup_action = Action::enabled_if(is_signup_input_valid.read_only(), {
			shadow_clone!(session, title, first_name, last_name, email, registration_password);
			move |()| {
				session.is_loading.set(true);
				session.register_user(SignupProfile {
					email: email.value(),
					password: registration_password.value(),
					first_name: first_name.value(),
					last_name: last_name.value(),
					title: title.value(),
				})
			}
		});

		base.alert_on(&login_action.errors());
		base.alert_on(&signup_action.errors());

		Self {
			base,
			username,
			password,
			title,
			first_name,
			last_name,
			email,
			registration_password,
			registration_password_confirmation,
			is_login_input_valid,
			is_signup_input_valid,
			session,
			login_action,
			signup_action,
		}
	}

	/// Log-in username input.
	#[must_use]
	pub fn username(&self) -> &MutableProperty<String> {
		&self.username
	}

	/// Log-in password input.
	#[must_use]
	pub fn password(&self) -> &MutableProperty<String> {
		&self.password
	}

	/// Sign-up form of address input.
	#[must_use]
	pub fn title(&self) -> &MutableProperty<String> {
		&self.title
	}

	/// Sign-up given name input.
	#[must_use]
	pub fn first_name(&self) -> &MutableProperty<String> {
		&self.first_name
	}

	/// Sign-up family name input.
	#[must_use]
	pub fn last_name(&self) -> &MutableProperty<String> {
		&self.last_name
	}

	/// Sign-up email input. Becomes the username.
	#[must_use]
	pub fn email(&self) -> &MutableProperty<String> {
		&self.email
	}

	/// Sign-up password input.
	#[must_use]
	pub fn registration_password(&self) -> &MutableProperty<String> {
		&self.registration_password
	}

	/// Sign-up password confirmation input. Must match the password.
	#[must_use]
	pub fn registration_password_confirmation(&self) -> &MutableProperty<String> {
		&self.registration_password_confirmation
	}

	/// Whether a customer is logged in.
	#[must_use]
	pub fn is_logged_in(&self) -> ReadOnlyProperty<bool> {
		self.session.is_logged_in.read_only()
	}

	/// Whether a request to the backend is in flight.
	#[must_use]
	pub fn is_loading(&self) -> ReadOnlyProperty<bool> {
		self.session.is_loading.read_only()
	}

	/// Whether both log-in fields are filled in.
	#[must_use]
	pub fn is_login_input_valid(&self) -> ReadOnlyProperty<bool> {
		self.is_login_input_valid.read_only()
	}

	/// Whether all sign-up fields are filled in and the passwords match.
	#[must_use]
	pub fn is_signup_input_valid(&self) -> ReadOnlyProperty<bool> {
		self.is_signup_input_valid.read_only()
	}

	/// Logs in with [`username`](`LoginViewModel::username`) and
	/// [`password`](`LoginViewModel::password`).
	#[must_use]
	pub fn login_action(&self) -> &Action<(), (), AuthError> {
		&self.login_action
	}

	/// Signs up with the sign-up inputs, then logs in.
	#[must_use]
	pub fn signup_action(&self) -> &Action<(), (), AuthError> {
		&self.signup_action
	}

	/// The username of the last successful log-in, if any.
	#[must_use]
	pub fn logged_in_username(&self) -> Option<String> {
		self.session.settings.string(LOGGED_IN_USERNAME_KEY)
	}
}

impl ViewModel for LoginViewModel {
	fn base(&self) -> &ViewModelBase {
		&self.base
	}
}
