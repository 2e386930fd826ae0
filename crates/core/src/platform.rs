//! Host environment seam.
//!
//! The strategies never touch the DOM directly. They drive a [`Platform`],
//! which the web crate implements on top of `web-sys` and
//! `testing::MockPlatform` implements for tests.
//! All callbacks run on the same single-threaded executor as the strategies.

use futures::future::LocalBoxFuture;

use crate::capability::Capabilities;
use crate::error::Result;
use crate::handlers::{Callback, Subscription};

/// Media element events the video fallback listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEvent {
	LoadedMetadata,
	TimeUpdate,
	Pause,
	Ended,
	Error,
}

impl MediaEvent {
	/// DOM event type name.
	pub fn as_str(self) -> &'static str {
		match self {
			MediaEvent::LoadedMetadata => "loadedmetadata",
			MediaEvent::TimeUpdate => "timeupdate",
			MediaEvent::Pause => "pause",
			MediaEvent::Ended => "ended",
			MediaEvent::Error => "error",
		}
	}
}

/// Browser-like environment.
pub trait Platform: 'static {
	type Lock: LockHandle;
	type Video: VideoElement;

	/// Inspects the environment for strategy selection.
	fn capabilities(&self) -> Capabilities;

	/// Requests a screen wake lock.
	fn request_wake_lock(&self) -> LocalBoxFuture<'static, Result<Self::Lock>>;

	/// Whether the page is currently visible.
	fn is_visible(&self) -> bool;

	fn on_visibility_change(&self, callback: Callback) -> Subscription;

	fn on_fullscreen_change(&self, callback: Callback) -> Subscription;

	/// Creates a detached video element.
	fn create_video(&self) -> Result<Self::Video>;

	/// Uniform random number in `[0, 1)`.
	fn random(&self) -> f64;

	/// Runs a background future on the local executor.
	fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

/// A held screen wake lock.
pub trait LockHandle: 'static {
	/// Releases the lock. Failures are the platform's to report.
	fn release(&self);

	/// Whether the platform already released the lock.
	fn released(&self) -> bool;

	/// Observes a platform-driven release.
	fn on_release(&self, callback: Callback) -> Subscription;
}

/// A video element owned by the fallback strategy.
pub trait VideoElement: 'static {
	fn set_attribute(&self, name: &str, value: &str) -> Result<()>;

	fn set_muted(&self, muted: bool);

	/// Appends a `<source>` child.
	fn append_source(&self, src: &str, mime_type: &str) -> Result<()>;

	fn set_style(&self, property: &str, value: &str) -> Result<()>;

	/// Appends the element to the document body.
	fn attach(&self) -> Result<()>;

	/// Removes the element from the document.
	fn detach(&self);

	fn play(&self) -> LocalBoxFuture<'static, Result<()>>;

	fn pause(&self);

	fn paused(&self) -> bool;

	/// Message of the element's current media error, if any.
	fn media_error(&self) -> Option<String>;

	/// Clip duration in seconds; `NaN` until metadata is known.
	fn duration(&self) -> f64;

	fn current_time(&self) -> f64;

	fn set_current_time(&self, time: f64);

	fn set_loop(&self, looping: bool);

	fn set_playback_rate(&self, rate: f64);

	fn on(&self, event: MediaEvent, callback: Callback) -> Subscription;
}
