use std::{
	collections::{BTreeMap, VecDeque},
	fmt::{self, Debug, Formatter},
	mem,
	sync::Arc,
};

use parking_lot::{Mutex, ReentrantMutex};

use crate::{LegacyDisposable, LegacySignal, Object, Subscriber};

/// What a [`LegacySubject`] hands to subscribers that arrive late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replay {
	/// Nothing. After termination, late subscribers receive `completed`.
	Nothing,
	/// The latest value. After termination, late subscribers receive `completed`.
	Latest,
	/// Every value and the terminal event, exactly as they were sent.
	All,
}

/// A hot legacy signal that is sent to manually.
#[derive(Clone)]
pub struct LegacySubject(Arc<SubjectInner>);

struct SubjectInner {
	replay: Replay,
	serial: ReentrantMutex<()>,
	state: Mutex<SubjectState>,
}

struct SubjectState {
	subscribers: BTreeMap<u64, Subscriber>,
	next_key: u64,
	history: VecDeque<Option<Object>>,
	terminal: Option<Terminal>,
}

#[derive(Clone)]
enum Terminal {
	Error(Option<Object>),
	Completed,
}

impl Terminal {
	fn deliver(&self, subscriber: &Subscriber) {
		match self {
			Terminal::Error(error) => subscriber.send_error(error.clone()),
			Terminal::Completed => subscriber.send_completed(),
		}
	}
}

impl Debug for LegacySubject {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = self.0.state.lock();
		f.debug_struct("LegacySubject")
			.field("replay", &self.0.replay)
			.field("subscribers", &state.subscribers.len())
			.field("terminated", &state.terminal.is_some())
			.finish()
	}
}

impl Default for LegacySubject {
	fn default() -> Self {
		Self::new()
	}
}

impl LegacySubject {
	/// A plain subject ([`Replay::Nothing`]).
	#[must_use]
	pub fn new() -> Self {
		Self::with_replay(Replay::Nothing, None)
	}

	/// A subject that starts out holding `initial` and replays its latest value ([`Replay::Latest`]).
	#[must_use]
	pub fn behavior(initial: Option<Object>) -> Self {
		Self::with_replay(Replay::Latest, Some(initial))
	}

	/// A subject that replays everything ([`Replay::All`]).
	#[must_use]
	pub fn replay() -> Self {
		Self::with_replay(Replay::All, None)
	}

	fn with_replay(replay: Replay, initial: Option<Option<Object>>) -> Self {
		Self(Arc::new(SubjectInner {
			replay,
			serial: ReentrantMutex::new(()),
			state: Mutex::new(SubjectState {
				subscribers: BTreeMap::new(),
				next_key: 0,
				history: initial.into_iter().collect(),
				terminal: None,
			}),
		}))
	}

	/// Sends `value` to current subscribers. Ignored after termination.
	pub fn send_next(&self, value: Option<Object>) {
		let _serial = self.0.serial.lock();
		let subscribers: Vec<_> = {
			let mut state = self.0.state.lock();
			if state.terminal.is_some() {
				return;
			}
			match self.0.replay {
				Replay::Nothing => (),
				Replay::Latest => {
					state.history.clear();
					state.history.push_back(value.clone());
				}
				Replay::All => state.history.push_back(value.clone()),
			}
			state.subscribers.values().cloned().collect()
		};
		for subscriber in subscribers {
			subscriber.send_next(value.clone());
		}
	}

	/// Fails the subject. Ignored after termination.
	pub fn send_error(&self, error: Option<Object>) {
		self.terminate(Terminal::Error(error));
	}

	/// Completes the subject. Ignored after termination.
	pub fn send_completed(&self) {
		self.terminate(Terminal::Completed);
	}

	fn terminate(&self, terminal: Terminal) {
		let _serial = self.0.serial.lock();
		let subscribers = {
			let mut state = self.0.state.lock();
			if state.terminal.is_some() {
				return;
			}
			state.terminal = Some(terminal.clone());
			mem::take(&mut state.subscribers)
		};
		for subscriber in subscribers.into_values() {
			terminal.deliver(&subscriber);
		}
	}

	/// The subject's values as a [`LegacySignal`].
	#[must_use]
	pub fn signal(&self) -> LegacySignal {
		let inner = Arc::clone(&self.0);
		LegacySignal::create(move |subscriber| {
			// Held across replay and registration so that no event slips in between.
			let _serial = inner.serial.lock();
			let (history, terminal, key) = {
				let mut state = inner.state.lock();
				let terminal = state.terminal.clone();
				let history: Vec<_> = if terminal.is_none() || inner.replay == Replay::All {
					state.history.iter().cloned().collect()
				} else {
					Vec::new()
				};
				let key = terminal.is_none().then(|| {
					let key = state.next_key;
					state.next_key += 1;
					state.subscribers.insert(key, subscriber.clone());
					key
				});
				(history, terminal, key)
			};

			for value in history {
				subscriber.send_next(value);
			}

			match (terminal, key) {
				(Some(terminal), _) if inner.replay == Replay::All => {
					terminal.deliver(&subscriber);
					None
				}
				(Some(_), _) => {
					subscriber.send_completed();
					None
				}
				(None, Some(key)) => {
					let inner = Arc::downgrade(&inner);
					Some(LegacyDisposable::new(move || {
						if let Some(inner) = inner.upgrade() {
							inner.state.lock().subscribers.remove(&key);
						}
					}))
				}
				(None, None) => unreachable!(),
			}
		})
	}
}
