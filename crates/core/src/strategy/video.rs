//! Hidden-video fallback.
//!
//! A muted, inline, off-screen video keeps playing for as long as the screen
//! should stay awake. The element must stay in the document and laid out:
//! some mobile browsers ignore detached or `display: none` video.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::json;

use crate::config::{NoSleepOptions, PlaybackTuning};
use crate::error::{Error, Result};
use crate::handlers::{Callback, Subscription};
use crate::logging::Logger;
use crate::platform::{MediaEvent, Platform, VideoElement};

/// Off-screen placement that keeps the element laid out.
const OFFSCREEN_STYLE: [(&str, &str); 5] = [
	("position", "absolute"),
	("left", "-100%"),
	("top", "-100%"),
	("width", "1px"),
	("height", "1px"),
];

#[derive(Debug, Default)]
struct VideoState {
	enabled: bool,
	/// Set once metadata shows a clip too long to loop natively.
	seek_reset_armed: bool,
	generation: u64,
	disposed: bool,
}

struct Inner<P: Platform> {
	platform: Rc<P>,
	video: P::Video,
	tuning: PlaybackTuning,
	state: RefCell<VideoState>,
	subs: RefCell<Vec<Subscription>>,
	logger: Logger,
}

/// Wake strategy that plays a hidden video.
pub struct VideoWakeLock<P: Platform> {
	inner: Rc<Inner<P>>,
}

impl<P: Platform> Clone for VideoWakeLock<P> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<P: Platform> VideoWakeLock<P> {
	/// Builds the hidden video and appends it to the document body.
	///
	/// # Errors
	///
	/// Returns [`Error::Dom`] if the element cannot be created or attached.
	pub fn new(platform: Rc<P>, options: &NoSleepOptions, logger: Logger) -> Result<Self> {
		let video = platform.create_video()?;
		video.set_attribute("title", &options.video_title)?;
		video.set_attribute("playsinline", "")?;
		video.set_attribute("muted", "")?;
		video.set_muted(true);

		let sources = options.sources();
		for &format in options.video_source_type.formats() {
			video.append_source(sources.src(format), format.mime_type())?;
		}
		for (property, value) in OFFSCREEN_STYLE {
			video.set_style(property, value)?;
		}
		video.attach()?;

		let inner = Rc::new(Inner {
			platform,
			video,
			tuning: options.tuning,
			state: RefCell::new(VideoState::default()),
			subs: RefCell::new(Vec::new()),
			logger,
		});

		let subs = [
			MediaEvent::LoadedMetadata,
			MediaEvent::TimeUpdate,
			MediaEvent::Pause,
			MediaEvent::Ended,
			MediaEvent::Error,
		]
		.map(|event| inner.video.on(event, media_callback(Rc::downgrade(&inner), event)));
		inner.subs.borrow_mut().extend(subs);

		inner.logger.debug(
			"Hidden video attached",
			json!({ "sources": options.video_source_type.formats().len() }),
		);
		Ok(Self { inner })
	}

	pub fn is_enabled(&self) -> bool {
		self.inner.state.borrow().enabled
	}

	/// Starts playback.
	///
	/// Must run in response to a user gesture where the browser gates autoplay.
	///
	/// # Errors
	///
	/// Returns [`Error::PlaybackDenied`] when `play()` is rejected and
	/// [`Error::Disposed`] after [`dispose`](Self::dispose).
	pub async fn enable(&self) -> Result<()> {
		let generation = {
			let state = self.inner.state.borrow();
			if state.disposed {
				return Err(Error::Disposed);
			}
			state.generation
		};

		let play = self.inner.video.play();
		match play.await {
			Ok(()) => {
				let stale = {
					let mut state = self.inner.state.borrow_mut();
					let stale = state.disposed || state.generation != generation;
					if !stale {
						state.enabled = true;
					}
					stale
				};
				if stale {
					self.inner.video.pause();
				} else {
					self.inner.logger.debug("Hidden video playing", json!({}));
				}
				Ok(())
			}
			Err(err) => {
				let stale = {
					let mut state = self.inner.state.borrow_mut();
					state.enabled = false;
					state.disposed || state.generation != generation
				};
				// Pausing a pending play() rejects it; that is the disable winning.
				if stale {
					self.inner
						.logger
						.debug("Hidden video play() aborted by disable", json!({ "error": err.to_string() }));
					return Ok(());
				}
				self.inner
					.logger
					.warn("Hidden video playback failed", json!({ "error": err.to_string() }));
				Err(err)
			}
		}
	}

	/// Pauses playback. Idempotent.
	pub fn disable(&self) {
		{
			let mut state = self.inner.state.borrow_mut();
			state.generation += 1;
			state.enabled = false;
		}
		self.inner.video.pause();
	}

	/// Removes every element listener and the element itself. Idempotent.
	pub fn dispose(&self) {
		{
			let mut state = self.inner.state.borrow_mut();
			if state.disposed {
				return;
			}
			state.disposed = true;
			state.generation += 1;
			state.enabled = false;
		}

		let subs = std::mem::take(&mut *self.inner.subs.borrow_mut());
		drop(subs);
		self.inner.video.pause();
		self.inner.video.detach();
		self.inner.logger.debug("Hidden video disposed", json!({}));
	}

	fn handle_event(&self, event: MediaEvent) {
		match event {
			MediaEvent::LoadedMetadata => self.handle_metadata(),
			MediaEvent::TimeUpdate => self.handle_time_update(),
			MediaEvent::Pause | MediaEvent::Ended => {
				self.inner.state.borrow_mut().enabled = false;
			}
			MediaEvent::Error => self.handle_error(),
		}
	}

	fn handle_metadata(&self) {
		let duration = self.inner.video.duration();
		if duration.is_nan() {
			return;
		}

		let short = duration <= self.inner.tuning.loop_max_duration;
		self.inner.video.set_loop(short);
		self.inner.state.borrow_mut().seek_reset_armed = !short;
	}

	/// Seeks back before the clip can end.
	fn handle_time_update(&self) {
		if !self.inner.state.borrow().seek_reset_armed {
			return;
		}

		let tuning = self.inner.tuning;
		if self.inner.video.current_time() > tuning.seek_threshold {
			let target = self.inner.platform.random() * tuning.reset_span;
			self.inner.video.set_current_time(target);
			if let Some(rate) = tuning.playback_rate {
				self.inner.video.set_playback_rate(rate);
			}
		}
	}

	fn handle_error(&self) {
		let message = self
			.inner
			.video
			.media_error()
			.unwrap_or_else(|| "unknown media error".to_string());
		let err = Error::Media { message };
		self.inner
			.logger
			.error("Hidden video error", json!({ "error": err.to_string() }));

		let paused = self.inner.video.paused();
		self.inner.state.borrow_mut().enabled = !paused;
	}
}

fn media_callback<P: Platform>(weak: Weak<Inner<P>>, event: MediaEvent) -> Callback {
	Box::new(move || {
		if let Some(inner) = weak.upgrade() {
			VideoWakeLock { inner }.handle_event(event);
		}
	})
}
