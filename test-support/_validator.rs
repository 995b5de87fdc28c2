//! Shared by the integration tests of every workspace crate through `#[path]`.

use std::{collections::VecDeque, fmt::Debug, sync::Mutex};

/// A log of the events a test's observers saw.
///
/// Observers push into it from whichever thread delivers to them. The test then drains the
/// log with [`expect`](`Validator::expect`) when delivery order is defined, or with
/// [`take`](`Validator::take`) when threads race and only the multiset of events matters.
pub struct Validator<T>(Mutex<VecDeque<T>>);

#[allow(dead_code)]
impl<T> Validator<T> {
	pub const fn new() -> Self {
		Self(Mutex::new(VecDeque::new()))
	}

	pub fn push(&self, event: T) {
		self.0.lock().unwrap().push_back(event);
	}

	/// Drains the log and asserts that it equals `expected`, in order.
	#[track_caller]
	pub fn expect(&self, expected: impl IntoIterator<Item = T>)
	where
		T: Debug + PartialEq,
	{
		let seen: Vec<T> = self.take();
		let expected: Vec<T> = expected.into_iter().collect();
		assert_eq!(seen, expected);
	}

	/// Drains the log.
	pub fn take(&self) -> Vec<T> {
		self.0.lock().unwrap().drain(..).collect()
	}
}
