#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! Adapters between the legacy runtime ([`sunrise_legacy`]) and the typed one ([`sunrise_reactive`]).
//!
//! | From | To | Adapter |
//! |---|---|---|
//! | [`LegacySignal`](`sunrise_legacy::LegacySignal`) | [`SignalProducer`](`sunrise_reactive::SignalProducer`) | [`LegacySignalExt::to_producer`] |
//! | [`SignalProducer`](`sunrise_reactive::SignalProducer`) | [`LegacySignal`](`sunrise_legacy::LegacySignal`) | [`ProducerExt::to_legacy_signal`] |
//! | [`Signal`](`sunrise_reactive::Signal`) | [`LegacySignal`](`sunrise_legacy::LegacySignal`) | [`SignalExt::to_legacy_signal`] |
//! | [`LegacyCommand`](`sunrise_legacy::LegacyCommand`) | [`Action`](`sunrise_reactive::Action`) | [`bridged_action`] |
//! | [`Action`](`sunrise_reactive::Action`) | [`LegacyCommand`](`sunrise_legacy::LegacyCommand`) | [`ActionExt::to_legacy_command`] |
//!
//! The adapters hold no state of their own. Every failure arrives as a typed error on the
//! resulting stream, never synchronously.
//!
//! Values cross the boundary dynamically typed. [`Bridgeable`] converts them back, failing with
//! [`BridgeError::TypeMismatch`] where a dynamic cast would otherwise trap.

mod action;
mod bridgeable;
mod error;
pub mod input;
mod scheduler;
mod signal;

pub use action::{bridged_action, ActionExt};
pub use bridgeable::{Bridgeable, LegacyValuesExt};
pub use error::{BridgeError, FOREIGN_ERROR_MESSAGE, NIL_ERROR_MESSAGE};
pub use scheduler::{FromLegacyScheduler, ToLegacyScheduler, TARGET_QUEUE_NAME};
pub use signal::{to_producer_at, LegacySignalExt, ProducerExt, SignalExt};
