use std::sync::Arc;

use log::debug;
use sunrise_reactive::{
	shadow_clone, Action, Event, MutableProperty, NoError, Observer, Property, ReadOnlyProperty,
	SerialDisposable, SignalProducer,
};

use crate::{Store, StoreError, StoreService, ViewModel, ViewModelBase};

/// Store locator screen.
///
/// Stores are (re)loaded each time the screen becomes active. Leaving the screen
/// cancels a load in flight. Failed loads become
/// [alert messages](`ViewModelBase::alert_messages`).
pub struct MyStoreViewModel {
	base: ViewModelBase,
	stores: MutableProperty<Vec<Store>>,
	is_loading: MutableProperty<bool>,
	selected_index: MutableProperty<Option<usize>>,
	selected_store: MutableProperty<Option<Store>>,
	selected_store_name: MutableProperty<String>,
	selected_street_and_number_info: MutableProperty<String>,
	selected_zip_and_city_info: MutableProperty<String>,
	selected_open_line_1_info: MutableProperty<String>,
	refresh_action: Action<(), Vec<Store>, StoreError>,
	refresh_observer: Observer<(), NoError>,
	selected_index_observer: Observer<Option<usize>, NoError>,
}

impl MyStoreViewModel {
	/// Creates an inactive view model loading from `service`.
	pub fn new(service: Arc<dyn StoreService>) -> Self {
		let base = ViewModelBase::new();
		let stores = MutableProperty::new(Vec::new());
		let is_loading = MutableProperty::new(false);

		let refresh_action = Action::new({
			shadow_clone!(is_loading);
			move |()| {
				is_loading.set(true);
				shadow_clone!(is_loading);
				service.stores().on_event(move |event| {
					if event.is_terminal() {
						is_loading.set(false);
					}
				})
			}
		});
		base.lifetime().add(refresh_action.values().observe_values({
			shadow_clone!(stores);
			move |loaded| {
				debug!("Loaded {} store(s).", loaded.len());
				stores.set(loaded);
			}
		}));
		base.alert_on(&refresh_action.errors());
		base.run_while_active({
			shadow_clone!(refresh_action);
			move || refresh_action.apply(())
		});

		let refresh_run = SerialDisposable::new();
		base.lifetime().add(refresh_run.clone());
		let refresh_observer = Observer::new({
			shadow_clone!(refresh_action);
			move |event: Event<(), NoError>| {
				if !matches!(event, Event::Value(())) {
					return;
				}
				if refresh_action.is_enabled().value() {
					refresh_run.replace(refresh_action.apply(()).start_with(|_| ()));
				} else {
					debug!("Stores are loading already. Refresh request ignored.");
				}
			}
		});

		let selected_index = MutableProperty::new(None);
		let selected_store = MutableProperty::new(None);
		let selected_index_observer = Observer::new({
			shadow_clone!(selected_index);
			move |event: Event<Option<usize>, NoError>| {
				if let Event::Value(index) = event {
					selected_index.set(index);
				}
			}
		});
		base.lifetime().add(
			selected_store.bind(
				&stores
					.producer()
					.combine_latest(&selected_index.producer())
					.map(|(stores, index): (Vec<Store>, Option<usize>)| {
						index.and_then(|index| stores.get(index).cloned())
					}),
			),
		);

		let detail = |field: fn(&Store) -> &String| {
			let property = MutableProperty::new(String::new());
			base.lifetime().add(property.bind(&selected_store.producer().map(
				move |store: Option<Store>| store.as_ref().map(field).cloned().unwrap_or_default(),
			)));
			property
		};
		let selected_store_name = detail(|store| &store.name);
		let selected_street_and_number_info = detail(|store| &store.street_and_number);
		let selected_zip_and_city_info = detail(|store| &store.zip_and_city);
		let selected_open_line_1_info = detail(|store| &store.open_line_1);

		Self {
			base,
			stores,
			is_loading,
			selected_index,
			selected_store,
			selected_store_name,
			selected_street_and_number_info,
			selected_zip_and_city_info,
			selected_open_line_1_info,
			refresh_action,
			refresh_observer,
			selected_index_observer,
		}
	}

	/// Selects the store at `index` in [`stores`](`MyStoreViewModel::stores`).
	///
	/// An index past the end selects nothing.
	pub fn select_store(&self, index: usize) {
		self.selected_index.set(Some(index));
	}

	/// Clears the selection.
	pub fn deselect_store(&self) {
		self.selected_index.set(None);
	}

	/// Input for the selection, for list views that report it as a stream.
	/// `None` clears it.
	#[must_use]
	pub fn selected_index_observer(&self) -> Observer<Option<usize>, NoError> {
		self.selected_index_observer.clone()
	}

	/// Input for pull-to-refresh. Each value reloads the stores unless a load is in flight.
	///
	/// The reload is cancelled with the view model.
	#[must_use]
	pub fn refresh_observer(&self) -> Observer<(), NoError> {
		self.refresh_observer.clone()
	}

	/// The most recently loaded stores.
	#[must_use]
	pub fn stores(&self) -> ReadOnlyProperty<Vec<Store>> {
		self.stores.read_only()
	}

	/// Whether stores are being loaded.
	#[must_use]
	pub fn is_loading(&self) -> ReadOnlyProperty<bool> {
		self.is_loading.read_only()
	}

	/// The selected store, if the selection is in range.
	#[must_use]
	pub fn selected_store(&self) -> ReadOnlyProperty<Option<Store>> {
		self.selected_store.read_only()
	}

	/// Empty while nothing is selected, as are the other `selected_…` details.
	#[must_use]
	pub fn selected_store_name(&self) -> ReadOnlyProperty<String> {
		self.selected_store_name.read_only()
	}

	/// First address line of the selected store.
	#[must_use]
	pub fn selected_street_and_number_info(&self) -> ReadOnlyProperty<String> {
		self.selected_street_and_number_info.read_only()
	}

	/// Second address line of the selected store.
	#[must_use]
	pub fn selected_zip_and_city_info(&self) -> ReadOnlyProperty<String> {
		self.selected_zip_and_city_info.read_only()
	}

	/// First line of the selected store's opening hours.
	#[must_use]
	pub fn selected_open_line_1_info(&self) -> ReadOnlyProperty<String> {
		self.selected_open_line_1_info.read_only()
	}

	/// Reloads the stores, such as for pull-to-refresh.
	#[must_use]
	pub fn refresh_action(&self) -> &Action<(), Vec<Store>, StoreError> {
		&self.refresh_action
	}

	/// [`refresh_action`](`MyStoreViewModel::refresh_action`) as a fire-and-forget producer
	/// that never fails.
	#[must_use]
	pub fn refresh(&self) -> SignalProducer<Vec<Store>, NoError> {
		self.refresh_action.apply(()).flat_map_error(|error| {
			debug!("Store refresh failed: {error}");
			SignalProducer::empty()
		})
	}
}

impl ViewModel for MyStoreViewModel {
	fn base(&self) -> &ViewModelBase {
		&self.base
	}
}
