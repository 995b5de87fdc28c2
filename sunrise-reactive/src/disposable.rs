use std::{
	fmt::{self, Debug, Formatter},
	mem,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use parking_lot::Mutex;

/// A cancellation and release handle.
///
/// [`dispose`](`Disposable::dispose`) **must** be idempotent, non-blocking and callable from
/// any thread.
pub trait Disposable: Send + Sync {
	/// Releases the underlying resource.
	fn dispose(&self);

	/// Whether [`dispose`](`Disposable::dispose`) was called.
	fn is_disposed(&self) -> bool;
}

impl<D: ?Sized + Disposable> Disposable for Arc<D> {
	fn dispose(&self) {
		(**self).dispose();
	}

	fn is_disposed(&self) -> bool {
		(**self).is_disposed()
	}
}

impl<D: ?Sized + Disposable> Disposable for Box<D> {
	fn dispose(&self) {
		(**self).dispose();
	}

	fn is_disposed(&self) -> bool {
		(**self).is_disposed()
	}
}

/// Runs an action at most once, on first disposal.
#[derive(Clone)]
pub struct ActionDisposable(Arc<ActionInner>);

struct ActionInner {
	disposed: AtomicBool,
	action: Mutex<Option<Box<dyn Send + FnOnce()>>>,
}

impl Debug for ActionDisposable {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActionDisposable")
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

impl ActionDisposable {
	/// Creates a disposable that runs `action` on first disposal.
	pub fn new(action: impl 'static + Send + FnOnce()) -> Self {
		Self(Arc::new(ActionInner {
			disposed: AtomicBool::new(false),
			action: Mutex::new(Some(Box::new(action))),
		}))
	}

	/// Creates a disposable that does nothing but track its state.
	#[must_use]
	pub fn empty() -> Self {
		Self(Arc::new(ActionInner {
			disposed: AtomicBool::new(false),
			action: Mutex::new(None),
		}))
	}
}

impl Disposable for ActionDisposable {
	fn dispose(&self) {
		if !self.0.disposed.swap(true, Ordering::AcqRel) {
			let action = self.0.action.lock().take();
			if let Some(action) = action {
				action();
			}
		}
	}

	fn is_disposed(&self) -> bool {
		self.0.disposed.load(Ordering::Acquire)
	}
}

/// A set of children that are disposed together, each exactly once.
///
/// Children added after disposal are disposed immediately.
#[derive(Clone)]
pub struct CompositeDisposable(Arc<Mutex<Option<Vec<Box<dyn Disposable>>>>>);

impl Debug for CompositeDisposable {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let children = self.0.lock();
		f.debug_struct("CompositeDisposable")
			.field("disposed", &children.is_none())
			.field("children", &children.as_ref().map_or(0, Vec::len))
			.finish()
	}
}

impl Default for CompositeDisposable {
	fn default() -> Self {
		Self::new()
	}
}

impl CompositeDisposable {
	/// Creates an empty, live composite.
	#[must_use]
	pub fn new() -> Self {
		Self(Arc::new(Mutex::new(Some(Vec::new()))))
	}

	/// Adds `child`, or disposes it right away iff `self` is already disposed.
	pub fn add(&self, child: impl 'static + Disposable) {
		let child: Box<dyn Disposable> = Box::new(child);
		let rejected = match &mut *self.0.lock() {
			Some(children) => {
				// Keeps long-lived composites from accumulating dead handles.
				children.retain(|child| !child.is_disposed());
				children.push(child);
				None
			}
			None => Some(child),
		};
		if let Some(child) = rejected {
			child.dispose();
		}
	}

	/// Adds an [`ActionDisposable`] running `action`.
	pub fn add_action(&self, action: impl 'static + Send + FnOnce()) {
		self.add(ActionDisposable::new(action));
	}
}

impl Disposable for CompositeDisposable {
	fn dispose(&self) {
		let children = self.0.lock().take();
		for child in children.into_iter().flatten() {
			child.dispose();
		}
	}

	fn is_disposed(&self) -> bool {
		self.0.lock().is_none()
	}
}

/// A single-owner slot. Replacing its content disposes the previous one.
#[derive(Clone, Default)]
pub struct SerialDisposable(Arc<Mutex<SerialState>>);

#[derive(Default)]
struct SerialState {
	disposed: bool,
	current: Option<Box<dyn Disposable>>,
}

impl Debug for SerialDisposable {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = self.0.lock();
		f.debug_struct("SerialDisposable")
			.field("disposed", &state.disposed)
			.field("occupied", &state.current.is_some())
			.finish()
	}
}

impl SerialDisposable {
	/// Creates an empty, live slot.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Swaps `next` in and disposes the previous occupant.
	///
	/// Iff `self` is already disposed, `next` is disposed instead.
	pub fn replace(&self, next: impl 'static + Disposable) {
		let next: Box<dyn Disposable> = Box::new(next);
		let previous = {
			let mut state = self.0.lock();
			if state.disposed {
				Some(next)
			} else {
				mem::replace(&mut state.current, Some(next))
			}
		};
		if let Some(previous) = previous {
			previous.dispose();
		}
	}

	/// Disposes the current occupant, leaving the slot live and empty.
	pub fn clear(&self) {
		let previous = self.0.lock().current.take();
		if let Some(previous) = previous {
			previous.dispose();
		}
	}
}

impl Disposable for SerialDisposable {
	fn dispose(&self) {
		let previous = {
			let mut state = self.0.lock();
			state.disposed = true;
			state.current.take()
		};
		if let Some(previous) = previous {
			previous.dispose();
		}
	}

	fn is_disposed(&self) -> bool {
		self.0.lock().disposed
	}
}

/// Disposes its content when dropped.
#[must_use = "Scoped disposables dispose their content when dropped."]
#[derive(Debug)]
pub struct ScopedDisposable<D: Disposable>(D);

impl<D: Disposable> ScopedDisposable<D> {
	/// Takes ownership of `inner`'s disposal.
	pub fn new(inner: D) -> Self {
		Self(inner)
	}

	/// The wrapped disposable.
	pub fn inner(&self) -> &D {
		&self.0
	}
}

impl<D: Disposable> Drop for ScopedDisposable<D> {
	fn drop(&mut self) {
		self.0.dispose();
	}
}
