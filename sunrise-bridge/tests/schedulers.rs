use std::sync::Arc;

use futures_lite::future::block_on;
use sunrise_bridge::{FromLegacyScheduler, ToLegacyScheduler, TARGET_QUEUE_NAME};
use sunrise_dispatch::MainQueue;
use sunrise_legacy::{object, LegacyScheduler, LegacySignal};
use sunrise_reactive::{
	shadow_clone, Event, ImmediateScheduler, NoError, QueueScheduler, Scheduler, SignalProducer,
	UiScheduler,
};

#[path = "../../test-support/_validator.rs"]
mod _validator;
use _validator::Validator;

#[test]
fn queue_scheduler_shares_its_queue() {
	let scheduler = QueueScheduler::new("test.bridge-fifo");
	let legacy = scheduler.to_legacy_scheduler();
	assert_eq!(legacy.name(), TARGET_QUEUE_NAME);
	assert!(legacy.serial_queue().unwrap().same_queue(scheduler.queue()));

	let v = Arc::new(Validator::new());
	for n in 0..20 {
		shadow_clone!(v);
		if n % 3 == 0 {
			let _ = legacy.schedule(move || v.push(n));
		} else {
			let _ = scheduler.schedule(Box::new(move || v.push(n)));
		}
	}
	block_on(scheduler.queue().barrier());
	v.expect(0..20);
}

#[test]
fn fifo_across_delivery_paths() {
	let scheduler = QueueScheduler::new("test.bridge-delivery");
	let legacy = scheduler.to_legacy_scheduler();
	let v = Arc::new(Validator::new());

	let _typed = SignalProducer::<i32, NoError>::values([1, 2])
		.observe_on(scheduler.clone())
		.start_with({
			shadow_clone!(v);
			move |event| {
				if let Event::Value(n) = event {
					v.push(n);
				}
			}
		});
	let _legacy = LegacySignal::from_values([3, 4].map(|n| Some(object(n))))
		.deliver_on(legacy)
		.subscribe_values({
			shadow_clone!(v);
			move |value| v.push(*value.unwrap().downcast_ref::<i32>().unwrap())
		});
	block_on(scheduler.queue().barrier());

	v.expect([1, 2, 3, 4]);
}

#[test]
fn context_kinds_map_both_ways() {
	assert!(ImmediateScheduler.to_legacy_scheduler().is_immediate());

	let main = MainQueue::for_current_thread();
	let legacy_main = UiScheduler::new(main.clone()).to_legacy_scheduler();
	assert!(legacy_main.main_queue().is_some());

	let v = Arc::new(Validator::new());
	let typed_main = legacy_main.to_scheduler();
	let _ = typed_main.schedule(Box::new({
		shadow_clone!(v);
		move || v.push("inline")
	}));
	v.expect(["inline"]);

	let _ = LegacyScheduler::immediate()
		.to_scheduler()
		.schedule(Box::new({
			shadow_clone!(v);
			move || v.push("immediate")
		}));
	v.expect(["immediate"]);

	let queue = QueueScheduler::new("test.bridge-back");
	let back = queue.to_legacy_scheduler().to_scheduler();
	let _ = back.schedule(Box::new({
		shadow_clone!(v, queue);
		move || v.push(if queue.queue().is_current() { "queue" } else { "elsewhere" })
	}));
	block_on(queue.queue().barrier());
	v.expect(["queue"]);
}
