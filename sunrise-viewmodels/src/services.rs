//! Seams to the commerce backend and to local persistence.

use std::collections::HashMap;

use parking_lot::Mutex;
use sunrise_reactive::SignalProducer;

/// Failures of an [`AuthService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
	/// The backend rejected the credentials.
	#[error("invalid username or password")]
	InvalidCredentials,
	/// The backend rejected the sign-up, with its reason.
	#[error("sign-up rejected: {0}")]
	SignupRejected(String),
	/// The backend couldn't be reached or failed otherwise.
	#[error("authentication service unavailable: {0}")]
	Unavailable(String),
}

/// Called exactly once, from any thread, when an [`AuthService`] request finishes.
pub type Completion = Box<dyn Send + FnOnce(Result<(), AuthError>)>;

/// What a new customer signs up with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignupProfile {
	/// Doubles as the username.
	pub email: String,
	/// The new account's password.
	pub password: String,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Form of address, like "Mr." or "Dr.".
	pub title: String,
}

/// Customer authentication, callback-based like the backend SDK.
pub trait AuthService: Send + Sync {
	/// Whether a customer session exists already.
	fn is_logged_in(&self) -> bool;

	/// Logs in, calling `completion` once done.
	fn login(&self, username: &str, password: &str, completion: Completion);

	/// Creates a customer, calling `completion` once done. This does **not** log in.
	fn sign_up(&self, profile: &SignupProfile, completion: Completion);
}

/// Small persistent string settings.
pub trait KeyValueStore: Send + Sync {
	/// The value stored under `key`, if any.
	fn string(&self, key: &str) -> Option<String>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set_string(&self, key: &str, value: String);

	/// Removes the value stored under `key`, if any.
	fn remove(&self, key: &str);
}

/// A [`KeyValueStore`] that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore(Mutex<HashMap<String, String>>);

impl InMemoryStore {
	/// Creates an empty store.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyValueStore for InMemoryStore {
	fn string(&self, key: &str) -> Option<String> {
		self.0.lock().get(key).cloned()
	}

	fn set_string(&self, key: &str, value: String) {
		self.0.lock().insert(key.to_owned(), value);
	}

	fn remove(&self, key: &str) {
		self.0.lock().remove(key);
	}
}

/// A physical store, as shown by the store locator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Store {
	/// Display name.
	pub name: String,
	/// First address line.
	pub street_and_number: String,
	/// Second address line.
	pub zip_and_city: String,
	/// First line of the opening hours.
	pub open_line_1: String,
}

/// Failures of a [`StoreService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	/// The store list couldn't be loaded.
	#[error("failed to load stores: {0}")]
	Load(String),
}

/// The store locator backend.
pub trait StoreService: Send + Sync {
	/// Loads all stores. Sends one list, then completes.
	fn stores(&self) -> SignalProducer<Vec<Store>, StoreError>;
}
