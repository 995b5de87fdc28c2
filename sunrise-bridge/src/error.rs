use std::panic::Location;

use log::warn;
use sunrise_legacy::{LegacyError, Object};

/// Diagnostic of a `nil` legacy error.
pub const NIL_ERROR_MESSAGE: &str = "Nil legacy signal error";
/// Diagnostic of a legacy error that isn't an error value.
pub const FOREIGN_ERROR_MESSAGE: &str = "Non-error object sent as a legacy signal error";

/// Failures surfacing on the typed side of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
	/// A [`LegacyError`] sent by the legacy runtime.
	#[error(transparent)]
	Legacy(#[from] LegacyError),
	/// A legacy error that carried no usable error value.
	#[error("{message} (bridged at {location})")]
	Untyped {
		/// One of [`NIL_ERROR_MESSAGE`] and [`FOREIGN_ERROR_MESSAGE`].
		message: &'static str,
		/// Where the legacy stream was bridged.
		location: &'static Location<'static>,
	},
	/// A legacy value that didn't convert to the expected type.
	#[error("expected a value of type `{expected}` (bridged at {location})")]
	TypeMismatch {
		/// Name of the expected type.
		expected: &'static str,
		/// Where the conversion was requested.
		location: &'static Location<'static>,
	},
}

impl BridgeError {
	/// Interprets a legacy error object.
	///
	/// [`BridgeError`]s that went through the legacy runtime come back unchanged.
	#[must_use]
	pub fn from_legacy(error: Option<&Object>, location: &'static Location<'static>) -> Self {
		let Some(error) = error else {
			warn!("Nil legacy error at {location}.");
			return Self::Untyped {
				message: NIL_ERROR_MESSAGE,
				location,
			};
		};

		if let Some(error) = error.downcast_ref::<LegacyError>() {
			Self::Legacy(error.clone())
		} else if let Some(error) = error.downcast_ref::<BridgeError>() {
			error.clone()
		} else {
			warn!("Non-error legacy error at {location}.");
			Self::Untyped {
				message: FOREIGN_ERROR_MESSAGE,
				location,
			}
		}
	}
}
