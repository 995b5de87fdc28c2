use std::{any::type_name, convert::Infallible, panic::Location};

use log::warn;
use sunrise_legacy::{object, LegacyError, Object};
use sunrise_reactive::{ActionError, Event, Observer, Payload, SignalProducer};

use crate::BridgeError;

/// Types that cross the bridge as legacy [`Object`]s.
///
/// `None` stands for the legacy runtime's `nil`.
pub trait Bridgeable: Payload {
	/// Boxes `self` for the legacy runtime.
	fn into_object(self) -> Option<Object>;

	/// Recovers a value from the legacy runtime.
	///
	/// **Returns** [`None`] iff `object` isn't a representation of `Self`.
	fn from_object(object: Option<&Object>) -> Option<Self>;
}

macro_rules! bridge_by_downcast {
	($($ty:ty),*$(,)?) => {$(
		impl Bridgeable for $ty {
			fn into_object(self) -> Option<Object> {
				Some(object(self))
			}

			fn from_object(object: Option<&Object>) -> Option<Self> {
				object?.downcast_ref::<$ty>().cloned()
			}
		}
	)*};
}

bridge_by_downcast!(
	bool,
	i8,
	i16,
	i32,
	i64,
	isize,
	u8,
	u16,
	u32,
	u64,
	usize,
	f64,
	String,
	LegacyError,
);

/// Unit crosses as `nil`, and accepts anything.
impl Bridgeable for () {
	fn into_object(self) -> Option<Object> {
		None
	}

	fn from_object(_: Option<&Object>) -> Option<Self> {
		Some(())
	}
}

impl Bridgeable for Object {
	fn into_object(self) -> Option<Object> {
		Some(self)
	}

	fn from_object(object: Option<&Object>) -> Option<Self> {
		object.cloned()
	}
}

impl<T: Bridgeable> Bridgeable for Option<T> {
	fn into_object(self) -> Option<Object> {
		self.and_then(T::into_object)
	}

	fn from_object(object: Option<&Object>) -> Option<Self> {
		match object {
			None => Some(None),
			Some(_) => T::from_object(object).map(Some),
		}
	}
}

impl Bridgeable for Infallible {
	fn into_object(self) -> Option<Object> {
		match self {}
	}

	fn from_object(_: Option<&Object>) -> Option<Self> {
		None
	}
}

/// [`LegacyError`]s cross back unwrapped. Other variants cross as themselves.
impl Bridgeable for BridgeError {
	fn into_object(self) -> Option<Object> {
		match self {
			BridgeError::Legacy(error) => Some(object(error)),
			error => Some(object(error)),
		}
	}

	fn from_object(object: Option<&Object>) -> Option<Self> {
		let object = object?;
		object
			.downcast_ref::<BridgeError>()
			.cloned()
			.or_else(|| object.downcast_ref::<LegacyError>().cloned().map(Self::Legacy))
	}
}

/// [`ActionError::NotEnabled`] crosses as [`LegacyError::command_not_enabled`],
/// so that both runtimes agree on what a rejected execution looks like.
impl<E: Bridgeable> Bridgeable for ActionError<E> {
	fn into_object(self) -> Option<Object> {
		match self {
			ActionError::NotEnabled => Some(object(LegacyError::command_not_enabled())),
			ActionError::UpstreamFailed(error) => error.into_object(),
		}
	}

	fn from_object(object: Option<&Object>) -> Option<Self> {
		match object.and_then(|object| object.downcast_ref::<LegacyError>()) {
			Some(error) if error.is_command_not_enabled() => Some(ActionError::NotEnabled),
			_ => E::from_object(object).map(ActionError::UpstreamFailed),
		}
	}
}

/// Typed access to the raw values of a bridged legacy signal.
pub trait LegacyValuesExt {
	/// Converts each value to `T`.
	///
	/// A value that doesn't convert fails the producer with [`BridgeError::TypeMismatch`],
	/// located at the caller.
	#[track_caller]
	fn cast<T: Bridgeable>(&self) -> SignalProducer<T, BridgeError>;

	/// Like [`cast`](`LegacyValuesExt::cast`), with an explicit `location`.
	fn cast_at<T: Bridgeable>(
		&self,
		location: &'static Location<'static>,
	) -> SignalProducer<T, BridgeError>;
}

impl LegacyValuesExt for SignalProducer<Option<Object>, BridgeError> {
	#[track_caller]
	fn cast<T: Bridgeable>(&self) -> SignalProducer<T, BridgeError> {
		self.cast_at(Location::caller())
	}

	fn cast_at<T: Bridgeable>(
		&self,
		location: &'static Location<'static>,
	) -> SignalProducer<T, BridgeError> {
		self.lift(move |downstream: Observer<T, BridgeError>| {
			Observer::new(move |event: Event<Option<Object>, BridgeError>| match event {
				Event::Value(value) => match T::from_object(value.as_ref()) {
					Some(value) => downstream.send_value(value),
					None => {
						let expected = type_name::<T>();
						warn!("Legacy value is not a `{expected}` (bridged at {location}).");
						downstream.send_failed(BridgeError::TypeMismatch { expected, location });
					}
				},
				Event::Failed(error) => downstream.send_failed(error),
				Event::Completed => downstream.send_completed(),
				Event::Interrupted => downstream.send_interrupted(),
			})
		})
	}
}
