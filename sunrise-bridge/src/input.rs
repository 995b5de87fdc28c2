//! Value streams of legacy UI controls.

use std::panic::Location;

use log::debug;
use sunrise_legacy::LegacySignal;
use sunrise_reactive::{NoError, SignalProducer};

use crate::{to_producer_at, LegacyValuesExt};

/// The text values of a legacy text input. `nil` reads as the empty string.
///
/// Failures, including values that aren't text, end the producer quietly.
#[track_caller]
pub fn text_values(signal: &LegacySignal) -> SignalProducer<String, NoError> {
	let location = Location::caller();
	to_producer_at(signal, location)
		.cast_at::<Option<String>>(location)
		.map(Option::unwrap_or_default)
		.flat_map_error(|error| {
			debug!("Text input stream ended: {error}");
			SignalProducer::empty()
		})
}

/// One `()` per value of `signal`, such as a cell's reuse notifications.
///
/// Failures end the producer quietly.
#[track_caller]
pub fn unit_values(signal: &LegacySignal) -> SignalProducer<(), NoError> {
	to_producer_at(signal, Location::caller())
		.map(|_| ())
		.flat_map_error(|error| {
			debug!("Unit stream ended: {error}");
			SignalProducer::empty()
		})
}
