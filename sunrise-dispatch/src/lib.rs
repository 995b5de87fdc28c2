#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! Serial execution contexts shared by the typed and the legacy reactive runtime.
//!
//! Both runtimes schedule work onto the *same* queues, which is what lets a scheduler
//! from one runtime be translated into the other without reordering work:
//!
//! - [`SerialQueue`] owns a dedicated worker thread and runs jobs strictly in submission order.
//! - [`MainQueue`] is the UI-confined domain. It never spawns anything and only runs work
//!   when its owner thread [drains](`MainQueue::drain`) it.
//!
//! # Threading Notes
//!
//! Jobs that panic are caught and logged. A panicking job does not take its queue down.

mod main_queue;
mod serial_queue;

pub use main_queue::MainQueue;
pub use serial_queue::SerialQueue;

/// A unit of work submitted to a queue.
pub type Job = Box<dyn 'static + Send + FnOnce()>;
