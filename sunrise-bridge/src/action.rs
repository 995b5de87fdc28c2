use std::{any::type_name, panic::Location};

use log::{debug, warn};
use sunrise_legacy::{object, LegacyCommand, LegacySignal, Object};
use sunrise_reactive::{Action, Concurrency, MutableProperty, NoError, Property, SignalProducer};

use crate::{to_producer_at, BridgeError, Bridgeable, ProducerExt};

/// An [`Action`] that executes `command`.
///
/// The action is enabled while `command` is. Values of the command's `enabled` signal that
/// aren't [`bool`], and its failure, count as `false`.
/// Untyped errors are located at the caller.
#[track_caller]
pub fn bridged_action(command: &LegacyCommand) -> Action<Option<Object>, Option<Object>, BridgeError> {
	let location = Location::caller();

	let enabled = MutableProperty::new(command.is_enabled());
	let _ = enabled.bind(
		&to_producer_at(&command.enabled(), location)
			.map(|value| {
				bool::from_object(value.as_ref()).unwrap_or_else(|| {
					warn!("Non-boolean value on a legacy command's enabled signal. Treating it as `false`.");
					false
				})
			})
			.flat_map_error(|error| {
				debug!("A legacy command's enabled signal failed: {error}");
				SignalProducer::<bool, NoError>::value(false)
			}),
	);

	let command = command.clone();
	Action::enabled_if_with(enabled, Concurrency::Serial, move |input: Option<Object>| {
		let command = command.clone();
		to_producer_at(
			&LegacySignal::defer(move || command.execute(input.clone())),
			location,
		)
	})
}

/// Bridges [`Action`]s to the legacy runtime.
pub trait ActionExt {
	/// A [`LegacyCommand`] that applies `self`.
	///
	/// The command is enabled while `self` is, and lets executions overlap so that only
	/// `self` gates them. Inputs that don't convert fail with [`BridgeError::TypeMismatch`],
	/// located at the caller.
	#[track_caller]
	fn to_legacy_command(&self) -> LegacyCommand;
}

impl<I: Bridgeable, O: Bridgeable, E: Bridgeable> ActionExt for Action<I, O, E> {
	#[track_caller]
	fn to_legacy_command(&self) -> LegacyCommand {
		let location = Location::caller();
		let action = self.clone();
		let command = LegacyCommand::with_enabled(
			&self.is_enabled().producer().to_legacy_signal(),
			move |input| match I::from_object(input.as_ref()) {
				Some(input) => action.apply(input).to_legacy_signal(),
				None => {
					let expected = type_name::<I>();
					warn!("Legacy command input is not a `{expected}` (bridged at {location}).");
					LegacySignal::error(Some(object(BridgeError::TypeMismatch {
						expected,
						location,
					})))
				}
			},
		);
		command.set_allows_concurrent_execution(true);
		command
	}
}
