use std::{any::Any, sync::Arc};

/// A dynamically typed, shareable value. `None` on the wire plays the role of `nil`.
pub type Object = Arc<dyn Any + Send + Sync>;

/// Boxes `value` as [`Object`].
pub fn object<T: Any + Send + Sync>(value: T) -> Object {
	Arc::new(value)
}

/// The error type the legacy runtime itself produces.
///
/// Nothing forces senders to use it: legacy errors are arbitrary nullable [`Object`]s.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{domain} error {code}: {description}")]
pub struct LegacyError {
	/// Namespace of `code`.
	pub domain: String,
	/// Domain-specific error code.
	pub code: i64,
	/// Human-readable diagnostic.
	pub description: String,
}

impl LegacyError {
	/// Domain of errors raised by [`LegacyCommand`](`crate::LegacyCommand`).
	pub const COMMAND_DOMAIN: &'static str = "sunrise.legacy.command";
	/// Code for executing a disabled [`LegacyCommand`](`crate::LegacyCommand`).
	pub const COMMAND_NOT_ENABLED: i64 = 1;

	/// Creates a new [`LegacyError`].
	pub fn new(domain: impl Into<String>, code: i64, description: impl Into<String>) -> Self {
		Self {
			domain: domain.into(),
			code,
			description: description.into(),
		}
	}

	/// The error a disabled [`LegacyCommand`](`crate::LegacyCommand`) fails executions with.
	#[must_use]
	pub fn command_not_enabled() -> Self {
		Self::new(
			Self::COMMAND_DOMAIN,
			Self::COMMAND_NOT_ENABLED,
			"The command is disabled and cannot be executed",
		)
	}

	/// Whether this is the error from [`command_not_enabled`](`LegacyError::command_not_enabled`).
	#[must_use]
	pub fn is_command_not_enabled(&self) -> bool {
		self.domain == Self::COMMAND_DOMAIN && self.code == Self::COMMAND_NOT_ENABLED
	}
}
