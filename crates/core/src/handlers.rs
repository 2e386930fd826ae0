//! Listener registration handles.
//!
//! Every platform event registration hands back a [`Subscription`]. Dropping
//! it (or calling [`Subscription::unsubscribe`]) removes the listener, so a
//! strategy that owns its subscriptions cannot leak listeners across repeated
//! create/dispose cycles.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

/// Unique identifier for registered listeners.
pub type HandlerId = u64;

thread_local! {
	static NEXT_HANDLER_ID: Cell<HandlerId> = const { Cell::new(1) };
}

/// Returns a new handler ID, unique on the current thread.
pub fn next_handler_id() -> HandlerId {
	NEXT_HANDLER_ID.with(|next| {
		let id = next.get();
		next.set(id + 1);
		id
	})
}

/// Boxed callback invoked when a platform event fires.
pub type Callback = Box<dyn FnMut()>;

type ListenerEntries = RefCell<IndexMap<HandlerId, Rc<RefCell<Callback>>>>;

/// Insertion-ordered callback registry for hosts that dispatch events themselves.
#[derive(Default, Clone)]
pub struct Listeners {
	entries: Rc<ListenerEntries>,
}

impl Listeners {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `callback`; the returned [`Subscription`] removes it again.
	pub fn add(&self, callback: Callback) -> Subscription {
		let id = next_handler_id();
		self.entries
			.borrow_mut()
			.insert(id, Rc::new(RefCell::new(callback)));

		let weak: Weak<ListenerEntries> = Rc::downgrade(&self.entries);
		Subscription::new(id, move |id| {
			if let Some(entries) = weak.upgrade() {
				entries.borrow_mut().shift_remove(&id);
			}
		})
	}

	/// Invokes every registered callback in registration order.
	///
	/// Callbacks may add or remove listeners while the event is dispatched;
	/// the set invoked is the one registered when `emit` started.
	pub fn emit(&self) {
		let snapshot: Vec<_> = self.entries.borrow().values().cloned().collect();
		for callback in snapshot {
			if let Ok(mut callback) = callback.try_borrow_mut() {
				(callback)();
			}
		}
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl std::fmt::Debug for Listeners {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Listeners").field("len", &self.len()).finish()
	}
}

/// RAII handle that removes an event listener on drop.
pub struct Subscription {
	id: HandlerId,
	dropper: Option<Box<dyn FnOnce(HandlerId)>>,
}

impl Subscription {
	/// Creates a subscription that runs `dropper` once when released.
	pub fn new(id: HandlerId, dropper: impl FnOnce(HandlerId) + 'static) -> Self {
		Self {
			id,
			dropper: Some(Box::new(dropper)),
		}
	}

	/// Returns this subscription's handler ID.
	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	fn release(&mut self) {
		if let Some(dropper) = self.dropper.take() {
			dropper(self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.dropper.is_some())
			.finish()
	}
}
