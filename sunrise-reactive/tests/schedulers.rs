use std::{sync::Arc, thread};

use futures_lite::future::block_on;
use sunrise_dispatch::MainQueue;
use sunrise_reactive::{
	shadow_clone, Disposable, Event, ImmediateScheduler, NoError, QueueScheduler, Scheduler,
	SignalProducer, UiScheduler,
};

#[path = "../../test-support/_validator.rs"]
mod _validator;
use _validator::Validator;

#[test]
fn immediate_runs_inline() {
	let v = Arc::new(Validator::new());
	let cancel = ImmediateScheduler.schedule(Box::new({
		shadow_clone!(v);
		move || v.push(1)
	}));
	assert!(cancel.is_none());
	v.expect([1]);
}

#[test]
fn ui_scheduler_runs_inline_only_when_idle() {
	let v = Arc::new(Validator::new());
	let queue = MainQueue::for_current_thread();
	let scheduler = UiScheduler::new(queue.clone());

	assert!(scheduler
		.schedule(Box::new({
			shadow_clone!(v);
			move || v.push(1)
		}))
		.is_none());
	v.expect([1]);

	thread::scope(|s| {
		s.spawn(|| {
			let _ = scheduler.schedule(Box::new({
				shadow_clone!(v);
				move || v.push(2)
			}));
		});
	});
	// Something is queued now, so this must wait its turn.
	let _ = scheduler.schedule(Box::new({
		shadow_clone!(v);
		move || v.push(3)
	}));
	v.expect([]);

	assert_eq!(queue.drain(), 2);
	v.expect([2, 3]);
}

#[test]
fn cancelled_jobs_do_not_run() {
	let v = Arc::new(Validator::new());
	let scheduler = QueueScheduler::new("test.cancel");
	let queue = scheduler.queue().clone();
	queue.dispatch(|| thread::sleep(std::time::Duration::from_millis(20)));

	let cancel = scheduler
		.schedule(Box::new({
			shadow_clone!(v);
			move || v.push(1)
		}))
		.unwrap();
	cancel.dispose();
	block_on(queue.barrier());
	v.expect([]);
}

#[test]
fn observe_on_delivers_on_the_queue() {
	let scheduler = QueueScheduler::new("test.observe-on");
	let queue = scheduler.queue().clone();
	let v = Arc::new(Validator::new());

	let _subscription = SignalProducer::<i32, NoError>::values([1, 2])
		.observe_on(scheduler)
		.start_with({
			shadow_clone!(v, queue);
			move |event| v.push((queue.is_current(), event))
		});
	block_on(queue.barrier());

	v.expect([
		(true, Event::Value(1)),
		(true, Event::Value(2)),
		(true, Event::Completed),
	]);
}

#[test]
fn observe_on_drops_pending_events_after_disposal() {
	let scheduler = QueueScheduler::new("test.observe-on-dispose");
	let queue = scheduler.queue().clone();
	let (gate_sender, gate) = std::sync::mpsc::channel::<()>();
	queue.dispatch(move || {
		let _ = gate.recv();
	});

	let v = Arc::new(Validator::new());
	let subscription = SignalProducer::<i32, NoError>::values([1, 2])
		.observe_on(scheduler)
		.start_with({
			shadow_clone!(v);
			move |event| v.push(event)
		});
	subscription.dispose();
	gate_sender.send(()).unwrap();
	block_on(queue.barrier());

	v.expect([Event::Interrupted]);
}
