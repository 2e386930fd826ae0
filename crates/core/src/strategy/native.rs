//! Screen wake lock backed by the platform primitive.
//!
//! The platform may release the lock on its own, typically when the page is
//! backgrounded. The strategy keeps the released handle around and requests a
//! fresh lock the next time the page becomes visible, unless the caller
//! disabled it in the meantime.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::json;

use crate::error::{Error, Result};
use crate::handlers::{Callback, Subscription};
use crate::logging::Logger;
use crate::platform::{LockHandle, Platform};

struct NativeState<L> {
	handle: Option<L>,
	release_sub: Option<Subscription>,
	enabled: bool,
	in_flight: u32,
	reacquire_scheduled: bool,
	/// Bumped by `disable`; acquisitions started under an older value are stale.
	generation: u64,
	disposed: bool,
}

impl<L> NativeState<L> {
	/// A platform-released handle is held and nothing is acquiring a new one.
	fn awaiting_reacquire(&self) -> bool {
		!self.disposed && self.in_flight == 0 && self.handle.is_some() && !self.enabled
	}
}

struct Inner<P: Platform> {
	platform: Rc<P>,
	state: RefCell<NativeState<P::Lock>>,
	page_subs: RefCell<Vec<Subscription>>,
	logger: Logger,
}

/// Wake strategy using the platform screen wake lock.
pub struct NativeWakeLock<P: Platform> {
	inner: Rc<Inner<P>>,
}

impl<P: Platform> Clone for NativeWakeLock<P> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

/// Decrements the in-flight counter even if the acquisition future is dropped.
struct InFlight<P: Platform>(Rc<Inner<P>>);

impl<P: Platform> Drop for InFlight<P> {
	fn drop(&mut self) {
		let mut state = self.0.state.borrow_mut();
		state.in_flight = state.in_flight.saturating_sub(1);
	}
}

impl<P: Platform> NativeWakeLock<P> {
	/// Creates the strategy and starts watching visibility and fullscreen changes.
	pub fn new(platform: Rc<P>, logger: Logger) -> Self {
		let inner = Rc::new(Inner {
			platform,
			state: RefCell::new(NativeState {
				handle: None,
				release_sub: None,
				enabled: false,
				in_flight: 0,
				reacquire_scheduled: false,
				generation: 0,
				disposed: false,
			}),
			page_subs: RefCell::new(Vec::new()),
			logger,
		});

		let visibility = inner
			.platform
			.on_visibility_change(page_shown_callback(Rc::downgrade(&inner)));
		let fullscreen = inner
			.platform
			.on_fullscreen_change(page_shown_callback(Rc::downgrade(&inner)));
		inner.page_subs.borrow_mut().extend([visibility, fullscreen]);

		Self { inner }
	}

	pub fn is_enabled(&self) -> bool {
		self.inner.state.borrow().enabled
	}

	/// Requests a wake lock unless an unreleased one is already held.
	///
	/// # Errors
	///
	/// Returns [`Error::AcquisitionDenied`] when the platform rejects the
	/// request and [`Error::Disposed`] after [`dispose`](Self::dispose).
	pub async fn enable(&self) -> Result<()> {
		let generation = {
			let mut state = self.inner.state.borrow_mut();
			if state.disposed {
				return Err(Error::Disposed);
			}
			if state.enabled && state.handle.as_ref().is_some_and(|h| !h.released()) {
				return Ok(());
			}
			state.in_flight += 1;
			state.generation
		};
		let guard = InFlight(Rc::clone(&self.inner));

		let request = self.inner.platform.request_wake_lock();
		let outcome = request.await;
		drop(guard);

		let lock = match outcome {
			Ok(lock) => lock,
			Err(err) => {
				self.inner.state.borrow_mut().enabled = false;
				self.inner
					.logger
					.warn("Screen wake lock request failed", json!({ "error": err.to_string() }));
				return Err(err);
			}
		};

		let stale = {
			let state = self.inner.state.borrow();
			state.disposed || state.generation != generation
		};
		if stale {
			lock.release();
			self.inner
				.logger
				.debug("Released wake lock acquired after disable", json!({}));
			return Ok(());
		}

		let release_sub = lock.on_release(self.release_observer());
		let (previous, previous_sub) = {
			let mut state = self.inner.state.borrow_mut();
			state.enabled = true;
			(state.handle.replace(lock), state.release_sub.replace(release_sub))
		};
		drop(previous_sub);
		if let Some(previous) = previous {
			if !previous.released() {
				previous.release();
			}
		}

		self.inner.logger.debug("Screen wake lock acquired", json!({}));
		Ok(())
	}

	/// Releases the held lock, if any. Idempotent.
	pub fn disable(&self) {
		let (handle, release_sub) = {
			let mut state = self.inner.state.borrow_mut();
			state.generation += 1;
			state.enabled = false;
			(state.handle.take(), state.release_sub.take())
		};
		drop(release_sub);

		if let Some(handle) = handle {
			handle.release();
			self.inner.logger.debug("Screen wake lock released", json!({}));
		}
	}

	/// Removes page listeners and releases any held lock. Idempotent.
	pub fn dispose(&self) {
		{
			let mut state = self.inner.state.borrow_mut();
			if state.disposed {
				return;
			}
			state.disposed = true;
		}

		let subs = std::mem::take(&mut *self.inner.page_subs.borrow_mut());
		drop(subs);
		self.disable();
		self.inner.logger.debug("Native wake lock disposed", json!({}));
	}

	fn release_observer(&self) -> Callback {
		let weak = Rc::downgrade(&self.inner);
		Box::new(move || {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			let was_enabled = std::mem::replace(&mut inner.state.borrow_mut().enabled, false);
			inner
				.logger
				.debug("Screen wake lock released by platform", json!({ "wasEnabled": was_enabled }));
		})
	}

	/// Re-acquires a platform-released lock once the page is visible again.
	fn handle_page_shown(&self) {
		if !self.inner.platform.is_visible() {
			return;
		}

		let generation = {
			let mut state = self.inner.state.borrow_mut();
			if state.reacquire_scheduled || !state.awaiting_reacquire() {
				return;
			}
			state.reacquire_scheduled = true;
			state.generation
		};

		let this = self.clone();
		self.inner.platform.spawn_local(Box::pin(async move {
			{
				let mut state = this.inner.state.borrow_mut();
				state.reacquire_scheduled = false;
				// State may have moved on since scheduling.
				if state.generation != generation || !state.awaiting_reacquire() {
					return;
				}
			}
			if let Err(err) = this.enable().await {
				this.inner
					.logger
					.debug("Background wake lock re-acquisition failed", json!({ "error": err.to_string() }));
			}
		}));
	}
}

fn page_shown_callback<P: Platform>(weak: Weak<Inner<P>>) -> Callback {
	Box::new(move || {
		if let Some(inner) = weak.upgrade() {
			NativeWakeLock { inner }.handle_page_shown();
		}
	})
}
