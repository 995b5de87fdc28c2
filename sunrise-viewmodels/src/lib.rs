#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
//! View models of the Sunrise storefront.
//!
//! Each view model exposes [`MutableProperty`](`sunrise_reactive::MutableProperty`) inputs,
//! read-only outputs and [`Action`](`sunrise_reactive::Action`)s, and is driven by the
//! presentation layer through [`ViewModel::is_active`].
//!
//! Backends are reached through the traits in [`services`], so that tests can substitute them.

mod base;
mod login;
mod my_store;
pub mod services;

pub use base::{ViewModel, ViewModelBase};
pub use login::{LoginViewModel, LOGGED_IN_USERNAME_KEY};
pub use my_store::MyStoreViewModel;
pub use services::{
	AuthError, AuthService, Completion, InMemoryStore, KeyValueStore, SignupProfile, Store,
	StoreError, StoreService,
};
