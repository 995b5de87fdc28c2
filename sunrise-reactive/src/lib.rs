#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! Typed functional-reactive primitives for Sunrise view models.
//!
//! - [`Signal`] is a hot, multicast stream of [`Event`]s.
//! - [`SignalProducer`] is a cold recipe that creates a fresh [`Signal`] per start.
//! - [`MutableProperty`] is a bindable value that is itself an observable producer of its changes.
//! - [`Action`] is a gated factory of asynchronous operations.
//!
//! Disposal is the only cancellation mechanism. Every [`Disposable`] is idempotent and
//! non-blocking, and may be disposed from any thread.
//!
//! # Threading Notes
//!
//! Producers don't switch threads on their own. Use [`SignalProducer::observe_on`] with one of
//! the [`Scheduler`]s to redirect delivery.

mod action;
mod disposable;
mod event;
mod producer;
mod property;
mod scheduler;
mod signal;
mod stream;

pub use action::{Action, ActionError, Concurrency};
pub use disposable::{
	ActionDisposable, CompositeDisposable, Disposable, ScopedDisposable, SerialDisposable,
};
pub use event::Event;
pub use producer::SignalProducer;
pub use property::{ConstantProperty, MutableProperty, Property, ReadOnlyProperty};
pub use scheduler::{ImmediateScheduler, QueueScheduler, Scheduler, UiScheduler};
pub use signal::{Observer, Signal};
pub use stream::EventStream;

/// The error type of streams that never fail.
pub type NoError = std::convert::Infallible;

/// Bound for everything that travels through signals.
pub trait Payload: 'static + Clone + Send + Sync {}
impl<T: 'static + Clone + Send + Sync> Payload for T {}

/// Shadows each identifier with a clone of itself, for `move` closures.
#[macro_export]
macro_rules! shadow_clone {
	($($ident:ident),*$(,)?) => {
		$(let $ident = $ident.clone();)*
	};
}
