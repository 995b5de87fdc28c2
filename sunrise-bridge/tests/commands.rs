use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Arc,
};

use sunrise_bridge::{bridged_action, ActionExt, BridgeError, LegacySignalExt};
use sunrise_legacy::{object, LegacyCommand, LegacyError, LegacySignal, LegacySubject, Object};
use sunrise_reactive::{
	shadow_clone, Action, ActionError, Event, MutableProperty, Property, SignalProducer,
};

#[path = "../../test-support/_validator.rs"]
mod _validator;
use _validator::Validator;

#[test]
fn bridged_action_tracks_the_command() {
	let enabled = LegacySubject::behavior(Some(object(true)));
	let results = LegacySubject::new();
	let command = LegacyCommand::with_enabled(&enabled.signal(), {
		shadow_clone!(results);
		move |_| results.signal()
	});
	let action = bridged_action(&command);
	assert!(action.is_enabled().value());

	enabled.send_next(Some(object(false)));
	assert!(!action.is_enabled().value());
	enabled.send_next(Some(object("not a bool")));
	assert!(!action.is_enabled().value());
	enabled.send_next(Some(object(true)));
	assert!(action.is_enabled().value());

	let v = Arc::new(Validator::new());
	let _ = action.apply(Some(object(1))).start_with({
		shadow_clone!(v);
		move |event: Event<Option<Object>, ActionError<BridgeError>>| {
			v.push(event.map(|value| value.and_then(|v| v.downcast_ref::<i32>().copied())));
		}
	});
	assert!(command.is_executing());
	assert!(!action.is_enabled().value());

	results.send_next(Some(object(2)));
	results.send_completed();
	v.expect([Event::Value(Some(2)), Event::Completed]);
	assert!(!command.is_executing());
	assert!(action.is_enabled().value());
}

#[test]
fn bridged_action_surfaces_legacy_failures() {
	let command = LegacyCommand::new(|_| {
		LegacySignal::error(Some(object(LegacyError::new("auth", 401, "denied"))))
	});
	let action = bridged_action(&command);

	let v = Arc::new(Validator::new());
	let _ = action.apply(None).start_with({
		shadow_clone!(v);
		move |event| {
			if let Event::Failed(error) = event {
				v.push(error);
			}
		}
	});
	v.expect([ActionError::UpstreamFailed(BridgeError::Legacy(
		LegacyError::new("auth", 401, "denied"),
	))]);
}

#[test]
fn action_as_legacy_command() {
	let condition = MutableProperty::new(true);
	let calls = Arc::new(AtomicUsize::new(0));
	let action = Action::enabled_if(condition.read_only(), {
		shadow_clone!(calls);
		move |n: i32| {
			calls.fetch_add(1, Ordering::SeqCst);
			SignalProducer::<String, String>::value(format!("#{n}"))
		}
	});
	let command = action.to_legacy_command();
	assert!(command.is_enabled());

	let v = Arc::new(Validator::new());
	let _ = command.execute(Some(object(7))).subscribe_next(
		{
			shadow_clone!(v);
			move |value| v.push(value.unwrap().downcast_ref::<String>().unwrap().clone())
		},
		|_| unreachable!(),
		{
			shadow_clone!(v);
			move || v.push("completed".to_owned())
		},
	);
	v.expect(["#7".to_owned(), "completed".to_owned()]);

	condition.set(false);
	assert!(!command.is_enabled());
	let rejected = Arc::new(Validator::new());
	let _ = command.execute(Some(object(8))).subscribe_next(
		|_| unreachable!(),
		{
			shadow_clone!(rejected);
			move |e| {
				let e = e.unwrap();
				rejected.push(e.downcast_ref::<LegacyError>().unwrap().is_command_not_enabled());
			}
		},
		|| unreachable!(),
	);
	rejected.expect([true]);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn mistyped_command_input_is_a_bridge_error() {
	let action = Action::new(|n: i32| SignalProducer::<i32, String>::value(n));
	let command = action.to_legacy_command();

	let v = Arc::new(Validator::new());
	let _ = command
		.execute(Some(object("seven")))
		.to_producer()
		.start_with({
			shadow_clone!(v);
			move |event| {
				if let Event::Failed(BridgeError::TypeMismatch { expected, .. }) = event {
					v.push(expected);
				}
			}
		});
	v.expect(["i32"]);
}
