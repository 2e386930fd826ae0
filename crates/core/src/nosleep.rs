//! The [`NoSleep`] facade.

use std::rc::Rc;

use serde_json::json;

use crate::capability::{StrategyKind, resolve_strategy};
use crate::config::NoSleepOptions;
use crate::error::Result;
use crate::logging::{LogCategory, Logger};
use crate::platform::Platform;
use crate::strategy::{NativeWakeLock, NoOpWakeLock, VideoWakeLock};

enum Backend<P: Platform> {
	Native(NativeWakeLock<P>),
	Video(VideoWakeLock<P>),
	NoOp(NoOpWakeLock),
}

impl<P: Platform> Clone for Backend<P> {
	fn clone(&self) -> Self {
		match self {
			Backend::Native(native) => Backend::Native(native.clone()),
			Backend::Video(video) => Backend::Video(video.clone()),
			Backend::NoOp(noop) => Backend::NoOp(*noop),
		}
	}
}

/// Keeps the screen awake with the best strategy the platform supports.
///
/// The strategy is chosen once, at construction, and never changes. Clones
/// share the same strategy instance.
///
/// # Example
///
/// ```ignore
/// let no_sleep = NoSleep::new(platform, NoSleepOptions::default())?;
///
/// // From a click handler:
/// no_sleep.enable().await?;
/// assert!(no_sleep.is_enabled());
///
/// no_sleep.disable()?;
/// no_sleep.dispose();
/// ```
pub struct NoSleep<P: Platform> {
	backend: Backend<P>,
}

impl<P: Platform> Clone for NoSleep<P> {
	fn clone(&self) -> Self {
		Self {
			backend: self.backend.clone(),
		}
	}
}

impl<P: Platform> NoSleep<P> {
	/// Selects a strategy from the platform's capabilities.
	///
	/// # Errors
	///
	/// Returns [`Error::Dom`](crate::Error::Dom) if the video fallback cannot
	/// build its element.
	pub fn new(platform: P, options: NoSleepOptions) -> Result<Self> {
		Self::from_shared(Rc::new(platform), options)
	}

	/// Like [`new`](Self::new), for a platform shared with other owners.
	pub fn from_shared(platform: Rc<P>, options: NoSleepOptions) -> Result<Self> {
		let caps = platform.capabilities();
		let kind = resolve_strategy(caps);
		Logger::new(LogCategory::NoSleep, options.log_sink.clone()).info(
			"Selected wake strategy",
			json!({
				"strategy": kind.as_str(),
				"hasWakeLock": caps.has_wake_lock,
				"standalone": caps.standalone,
			}),
		);
		Self::with_kind(platform, kind, options)
	}

	/// Forces the hidden-video fallback regardless of capabilities.
	pub fn video_fallback(platform: P, options: NoSleepOptions) -> Result<Self> {
		Self::with_kind(Rc::new(platform), StrategyKind::VideoFallback, options)
	}

	fn with_kind(platform: Rc<P>, kind: StrategyKind, options: NoSleepOptions) -> Result<Self> {
		let backend = match kind {
			StrategyKind::NoOp => Backend::NoOp(NoOpWakeLock),
			StrategyKind::Native => Backend::Native(NativeWakeLock::new(
				platform,
				Logger::new(LogCategory::WakeLock, options.log_sink.clone()),
			)),
			StrategyKind::VideoFallback => {
				let logger = Logger::new(LogCategory::Video, options.log_sink.clone());
				Backend::Video(VideoWakeLock::new(platform, &options, logger)?)
			}
		};
		Ok(Self { backend })
	}

	/// Strategy selected at construction.
	pub fn kind(&self) -> StrategyKind {
		match &self.backend {
			Backend::Native(_) => StrategyKind::Native,
			Backend::Video(_) => StrategyKind::VideoFallback,
			Backend::NoOp(_) => StrategyKind::NoOp,
		}
	}

	/// Snapshot of whether the screen is currently kept awake.
	pub fn is_enabled(&self) -> bool {
		match &self.backend {
			Backend::Native(native) => native.is_enabled(),
			Backend::Video(video) => video.is_enabled(),
			Backend::NoOp(noop) => noop.is_enabled(),
		}
	}

	/// Engages the wake mechanism.
	///
	/// Call it from a user input handler: browsers that gate autoplay reject
	/// video playback started any other way.
	pub async fn enable(&self) -> Result<()> {
		match &self.backend {
			Backend::Native(native) => native.enable().await,
			Backend::Video(video) => video.enable().await,
			Backend::NoOp(noop) => noop.enable().await,
		}
	}

	/// Disengages the wake mechanism.
	///
	/// Never fails for the native and video strategies, and may be called any
	/// number of times.
	///
	/// # Errors
	///
	/// Returns [`Error::Unsupported`](crate::Error::Unsupported) without a document.
	pub fn disable(&self) -> Result<()> {
		match &self.backend {
			Backend::Native(native) => native.disable(),
			Backend::Video(video) => video.disable(),
			Backend::NoOp(noop) => return noop.disable(),
		}
		Ok(())
	}

	/// Releases every platform resource and listener.
	///
	/// The instance must not be reused afterwards; `enable()` then fails with
	/// [`Error::Disposed`](crate::Error::Disposed).
	pub fn dispose(&self) {
		match &self.backend {
			Backend::Native(native) => native.dispose(),
			Backend::Video(video) => video.dispose(),
			Backend::NoOp(_) => {}
		}
	}
}

impl<P: Platform> std::fmt::Debug for NoSleep<P> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NoSleep")
			.field("kind", &self.kind())
			.field("enabled", &self.is_enabled())
			.finish()
	}
}
