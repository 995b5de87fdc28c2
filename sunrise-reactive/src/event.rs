/// One event of a [`Signal`](`crate::Signal`).
///
/// Exactly one terminal event ([`Failed`](`Event::Failed`), [`Completed`](`Event::Completed`)
/// or [`Interrupted`](`Event::Interrupted`)) ends each event sequence. Nothing follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event<T, E> {
	/// A value.
	Value(T),
	/// Terminal failure.
	Failed(E),
	/// Terminal success.
	Completed,
	/// Terminal cancellation, caused by disposal.
	Interrupted,
}

impl<T, E> Event<T, E> {
	/// Whether this event ends its sequence.
	#[must_use]
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Event::Value(_))
	}

	/// Maps the value, if any.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Event<U, E> {
		match self {
			Event::Value(value) => Event::Value(f(value)),
			Event::Failed(error) => Event::Failed(error),
			Event::Completed => Event::Completed,
			Event::Interrupted => Event::Interrupted,
		}
	}

	/// Maps the error, if any.
	pub fn map_error<F>(self, f: impl FnOnce(E) -> F) -> Event<T, F> {
		match self {
			Event::Value(value) => Event::Value(value),
			Event::Failed(error) => Event::Failed(f(error)),
			Event::Completed => Event::Completed,
			Event::Interrupted => Event::Interrupted,
		}
	}

	/// The value, iff this is [`Value`](`Event::Value`).
	#[must_use]
	pub fn value(&self) -> Option<&T> {
		match self {
			Event::Value(value) => Some(value),
			_ => None,
		}
	}

	/// The error, iff this is [`Failed`](`Event::Failed`).
	#[must_use]
	pub fn error(&self) -> Option<&E> {
		match self {
			Event::Failed(error) => Some(error),
			_ => None,
		}
	}
}
