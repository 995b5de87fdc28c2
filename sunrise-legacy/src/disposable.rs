use std::{
	fmt::{self, Debug, Formatter},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use parking_lot::Mutex;

/// Runs a block at most once when disposed.
#[derive(Clone)]
pub struct LegacyDisposable(Arc<DisposableInner>);

struct DisposableInner {
	disposed: AtomicBool,
	block: Mutex<Option<Box<dyn Send + FnOnce()>>>,
}

impl Debug for LegacyDisposable {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LegacyDisposable")
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

impl LegacyDisposable {
	/// Creates a disposable that runs `block` on first disposal.
	pub fn new(block: impl 'static + Send + FnOnce()) -> Self {
		Self(Arc::new(DisposableInner {
			disposed: AtomicBool::new(false),
			block: Mutex::new(Some(Box::new(block))),
		}))
	}

	/// Creates a disposable that only tracks whether it was disposed.
	#[must_use]
	pub fn empty() -> Self {
		Self(Arc::new(DisposableInner {
			disposed: AtomicBool::new(false),
			block: Mutex::new(None),
		}))
	}

	/// Idempotent.
	pub fn dispose(&self) {
		if !self.0.disposed.swap(true, Ordering::AcqRel) {
			let block = self.0.block.lock().take();
			if let Some(block) = block {
				block();
			}
		}
	}

	/// Whether [`dispose`](`LegacyDisposable::dispose`) was called.
	#[must_use]
	pub fn is_disposed(&self) -> bool {
		self.0.disposed.load(Ordering::Acquire)
	}
}

/// Disposes all children together. Children added after disposal are disposed immediately.
#[derive(Clone)]
pub struct LegacyCompoundDisposable(Arc<Mutex<Option<Vec<LegacyDisposable>>>>);

impl Debug for LegacyCompoundDisposable {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LegacyCompoundDisposable")
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

impl Default for LegacyCompoundDisposable {
	fn default() -> Self {
		Self::new()
	}
}

impl LegacyCompoundDisposable {
	/// Creates an empty, live compound disposable.
	#[must_use]
	pub fn new() -> Self {
		Self(Arc::new(Mutex::new(Some(Vec::new()))))
	}

	/// Adds `child`, or disposes it right away iff `self` is already disposed.
	pub fn add(&self, child: LegacyDisposable) {
		let rejected = match &mut *self.0.lock() {
			Some(children) => {
				children.push(child);
				None
			}
			None => Some(child),
		};
		if let Some(child) = rejected {
			child.dispose();
		}
	}

	/// Idempotent. Children are disposed outside of the internal lock.
	pub fn dispose(&self) {
		let children = self.0.lock().take();
		for child in children.into_iter().flatten() {
			child.dispose();
		}
	}

	/// Whether [`dispose`](`LegacyCompoundDisposable::dispose`) was called.
	#[must_use]
	pub fn is_disposed(&self) -> bool {
		self.0.lock().is_none()
	}
}

impl From<LegacyCompoundDisposable> for LegacyDisposable {
	fn from(compound: LegacyCompoundDisposable) -> Self {
		LegacyDisposable::new(move || compound.dispose())
	}
}
