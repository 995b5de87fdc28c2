use std::sync::Arc;

use sunrise_legacy::LegacyScheduler;
use sunrise_reactive::{ImmediateScheduler, QueueScheduler, Scheduler, UiScheduler};

/// Name of the legacy schedulers created by [`QueueScheduler::to_legacy_scheduler`].
pub const TARGET_QUEUE_NAME: &str = "sunrise.bridge.QueueScheduler.to_legacy_scheduler()";

/// Maps a typed scheduler to the legacy scheduler for the same execution context.
pub trait ToLegacyScheduler {
	/// The equivalent [`LegacyScheduler`].
	fn to_legacy_scheduler(&self) -> LegacyScheduler;
}

impl ToLegacyScheduler for ImmediateScheduler {
	fn to_legacy_scheduler(&self) -> LegacyScheduler {
		LegacyScheduler::immediate()
	}
}

impl ToLegacyScheduler for UiScheduler {
	fn to_legacy_scheduler(&self) -> LegacyScheduler {
		LegacyScheduler::main_thread(self.main_queue().clone())
	}
}

/// The legacy scheduler shares the queue, so work scheduled through either stays in order.
impl ToLegacyScheduler for QueueScheduler {
	fn to_legacy_scheduler(&self) -> LegacyScheduler {
		LegacyScheduler::target_queue(TARGET_QUEUE_NAME, self.queue().clone())
	}
}

/// Maps a legacy scheduler to the typed scheduler for the same execution context.
pub trait FromLegacyScheduler {
	/// The equivalent [`Scheduler`].
	fn to_scheduler(&self) -> Arc<dyn Scheduler>;
}

impl FromLegacyScheduler for LegacyScheduler {
	fn to_scheduler(&self) -> Arc<dyn Scheduler> {
		if let Some(queue) = self.main_queue() {
			Arc::new(UiScheduler::new(queue.clone()))
		} else if let Some(queue) = self.serial_queue() {
			Arc::new(QueueScheduler::with_queue(queue.clone()))
		} else {
			debug_assert!(self.is_immediate());
			Arc::new(ImmediateScheduler)
		}
	}
}
