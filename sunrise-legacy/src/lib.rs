#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! The legacy reactive runtime.
//!
//! Everything that travels through it is dynamically typed: values and errors alike are
//! nullable [`Object`]s, and it is up to the receiving side to downcast them.
//!
//! - [`LegacySignal`] is cold. Each [`subscribe`](`LegacySignal::subscribe`) runs its
//!   subscription block again.
//! - [`LegacySubject`] is hot, with a configurable [`Replay`] policy for late subscribers.
//! - [`LegacyCommand`] gates an execution block behind an `enabled` signal.
//! - [`LegacyScheduler`] wraps the execution contexts from [`sunrise_dispatch`].
//!
//! # Late subscribers
//!
//! A subscriber that arrives after a hot signal terminated receives `completed` immediately,
//! unless the subject replays its full history (see [`Replay::All`]).

mod command;
mod disposable;
mod object;
mod scheduler;
mod signal;
mod subject;
mod subscriber;

pub use command::LegacyCommand;
pub use disposable::{LegacyCompoundDisposable, LegacyDisposable};
pub use object::{object, LegacyError, Object};
pub use scheduler::LegacyScheduler;
pub use signal::LegacySignal;
pub use subject::{LegacySubject, Replay};
pub use subscriber::Subscriber;
