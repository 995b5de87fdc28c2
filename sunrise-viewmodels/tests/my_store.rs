use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Barrier, Mutex,
	},
	thread,
};

use sunrise_reactive::{shadow_clone, ActionError, Event, Observer, Property, SignalProducer};
use sunrise_viewmodels::{MyStoreViewModel, Store, StoreError, StoreService, ViewModel};

#[path = "../../test-support/_validator.rs"]
mod _validator;
use _validator::Validator;

type Pending = Arc<Mutex<Vec<Observer<Vec<Store>, StoreError>>>>;

/// Keeps each load open until the test answers it.
#[derive(Default)]
struct FakeStores {
	pending: Pending,
	disposals: Arc<AtomicUsize>,
}

impl FakeStores {
	/// Sends `event` on the most recent open load. A terminal event closes it.
	fn answer(&self, event: Event<Vec<Store>, StoreError>) {
		let observer = {
			let mut pending = self.pending.lock().unwrap();
			if event.is_terminal() {
				pending.pop().unwrap()
			} else {
				pending.last().unwrap().clone()
			}
		};
		observer.send(event);
	}

	/// Loads started and not yet answered with a terminal event.
	fn loads(&self) -> usize {
		self.pending.lock().unwrap().len()
	}
}

impl StoreService for FakeStores {
	fn stores(&self) -> SignalProducer<Vec<Store>, StoreError> {
		let (pending, disposals) = (self.pending.clone(), self.disposals.clone());
		SignalProducer::new(move |observer, lifetime| {
			pending.lock().unwrap().push(observer);
			shadow_clone!(disposals);
			lifetime.add_action(move || {
				disposals.fetch_add(1, Ordering::SeqCst);
			});
		})
	}
}

fn store(name: &str, city: &str) -> Store {
	Store {
		name: name.to_owned(),
		street_and_number: format!("{name} Street 1"),
		zip_and_city: format!("12345 {city}"),
		open_line_1: "Mo-Fr 9-18".to_owned(),
	}
}

fn setup() -> (MyStoreViewModel, Arc<FakeStores>) {
	let service = Arc::new(FakeStores::default());
	(MyStoreViewModel::new(service.clone()), service)
}

#[test]
fn loads_on_activation() {
	let (vm, service) = setup();
	assert_eq!(service.loads(), 0);
	assert!(!vm.is_loading().value());

	vm.is_active().set(true);
	assert_eq!(service.loads(), 1);
	assert!(vm.is_loading().value());

	let stores = vec![store("Mitte", "Berlin"), store("Altona", "Hamburg")];
	service.answer(Event::Value(stores.clone()));
	assert_eq!(vm.stores().value(), stores);
	assert!(vm.is_loading().value());

	service.answer(Event::Completed);
	assert!(!vm.is_loading().value());
	assert!(!vm.refresh_action().is_executing().value());
}

#[test]
fn deactivation_cancels_the_load() {
	let (vm, service) = setup();
	vm.is_active().set(true);
	assert_eq!(service.disposals.load(Ordering::SeqCst), 0);

	vm.is_active().set(false);
	assert_eq!(service.disposals.load(Ordering::SeqCst), 1);
	assert!(!vm.is_loading().value());
	assert!(!vm.refresh_action().is_executing().value());

	service.answer(Event::Value(vec![store("Mitte", "Berlin")]));
	assert_eq!(vm.stores().value(), []);
}

#[test]
fn reactivation_reloads() {
	let (vm, service) = setup();
	vm.is_active().set(true);
	service.answer(Event::Value(vec![store("Mitte", "Berlin")]));
	service.answer(Event::Completed);

	vm.is_active().set(false);
	vm.is_active().set(true);
	assert_eq!(service.loads(), 1);
	service.answer(Event::Value(vec![]));
	assert_eq!(vm.stores().value(), []);
}

#[test]
fn failed_load_keeps_the_stores() {
	let (vm, service) = setup();
	vm.is_active().set(true);
	service.answer(Event::Value(vec![store("Mitte", "Berlin")]));
	service.answer(Event::Completed);

	let errors = Arc::new(Validator::new());
	let _ = vm.refresh_action().errors().observe_values({
		shadow_clone!(errors);
		move |error| errors.push(error)
	});
	let alerts = Arc::new(Validator::new());
	let _ = vm.base().alert_messages().observe_values({
		shadow_clone!(alerts);
		move |message| alerts.push(message)
	});

	let v = Arc::new(Validator::new());
	let _ = vm.refresh_action().apply(()).start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	let error = StoreError::Load("offline".to_owned());
	service.answer(Event::Failed(error.clone()));

	v.expect([Event::Failed(ActionError::UpstreamFailed(error.clone()))]);
	errors.expect([error]);
	alerts.expect(["failed to load stores: offline".to_owned()]);
	assert!(!vm.is_loading().value());
	assert_eq!(vm.stores().value(), [store("Mitte", "Berlin")]);
}

#[test]
fn refresh_is_rejected_while_loading() {
	let (vm, service) = setup();
	vm.is_active().set(true);

	let v = Arc::new(Validator::new());
	let _ = vm.refresh_action().apply(()).start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	v.expect([Event::Failed(ActionError::NotEnabled)]);
	assert_eq!(service.loads(), 1);
}

#[test]
fn refresh_swallows_failures() {
	let (vm, service) = setup();
	let v = Arc::new(Validator::new());
	let _ = vm.refresh().start_with({
		shadow_clone!(v);
		move |event| v.push(event)
	});
	assert_eq!(service.loads(), 1);

	service.answer(Event::Failed(StoreError::Load("offline".to_owned())));
	v.expect([Event::Completed]);
}

#[test]
fn selection() {
	let (vm, service) = setup();
	vm.select_store(1);
	assert_eq!(vm.selected_store().value(), None);

	vm.is_active().set(true);
	let (mitte, altona) = (store("Mitte", "Berlin"), store("Altona", "Hamburg"));
	service.answer(Event::Value(vec![mitte.clone(), altona.clone()]));
	assert_eq!(vm.selected_store().value(), Some(altona.clone()));
	assert_eq!(vm.selected_store_name().value(), "Altona");
	assert_eq!(
		vm.selected_street_and_number_info().value(),
		"Altona Street 1"
	);
	assert_eq!(vm.selected_zip_and_city_info().value(), "12345 Hamburg");
	assert_eq!(vm.selected_open_line_1_info().value(), "Mo-Fr 9-18");

	vm.select_store(0);
	assert_eq!(vm.selected_store_name().value(), "Mitte");

	vm.select_store(2);
	assert_eq!(vm.selected_store().value(), None);
	assert_eq!(vm.selected_store_name().value(), "");

	vm.select_store(0);
	vm.deselect_store();
	assert_eq!(vm.selected_store().value(), None);
	assert_eq!(vm.selected_zip_and_city_info().value(), "");
}

#[test]
fn selection_input() {
	let (vm, service) = setup();
	vm.is_active().set(true);
	service.answer(Event::Value(vec![store("Mitte", "Berlin")]));

	let selection = vm.selected_index_observer();
	selection.send_value(Some(0));
	assert_eq!(vm.selected_store_name().value(), "Mitte");
	selection.send_value(None);
	assert_eq!(vm.selected_store().value(), None);
}

#[test]
fn refresh_input() {
	let (vm, service) = setup();
	let refresh = vm.refresh_observer();

	refresh.send_value(());
	assert_eq!(service.loads(), 1);
	refresh.send_value(());
	assert_eq!(service.loads(), 1);

	service.answer(Event::Value(vec![store("Mitte", "Berlin")]));
	service.answer(Event::Completed);
	assert!(!vm.is_loading().value());

	refresh.send_value(());
	assert_eq!(service.loads(), 1);
	assert!(vm.is_loading().value());

	drop(vm);
	assert_eq!(service.disposals.load(Ordering::SeqCst), 2);
}

#[test]
fn deactivation_while_stores_arrive_on_another_thread() {
	let (vm, service) = setup();
	vm.is_active().set(true);

	// Holds up the delivery of the loaded stores until the screen was left.
	let (entered, release) = (Arc::new(Barrier::new(2)), Arc::new(Barrier::new(2)));
	let _ = vm.refresh_action().values().observe_values({
		shadow_clone!(entered, release);
		move |_| {
			entered.wait();
			release.wait();
		}
	});

	let loader = {
		shadow_clone!(service);
		thread::spawn(move || service.answer(Event::Value(vec![store("Mitte", "Berlin")])))
	};
	entered.wait();
	vm.is_active().set(false);
	release.wait();
	loader.join().unwrap();

	assert!(!vm.is_loading().value());
	assert!(!vm.refresh_action().is_executing().value());
	assert_eq!(service.disposals.load(Ordering::SeqCst), 1);

	vm.is_active().set(true);
	assert!(vm.is_loading().value());
}
