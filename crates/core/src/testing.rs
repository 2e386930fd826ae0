//! Testing infrastructure for the wake strategies.
//!
//! [`MockPlatform`] implements [`Platform`] without a browser. It records every
//! platform call as a [`MockAction`], lets tests script wake-lock and playback
//! outcomes, and exposes hooks to fire the events a browser would deliver.
//!
//! # Example
//!
//! ```ignore
//! use nosleep::testing::MockPlatform;
//!
//! #[tokio::test]
//! async fn reacquires_after_release() {
//!     let platform = MockPlatform::native();
//!     let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default())?;
//!     no_sleep.enable().await?;
//!
//!     platform.last_lock().unwrap().platform_release();
//!     platform.set_visible(true);
//!     platform.run_spawned().await;
//!
//!     assert_eq!(platform.request_count(), 2);
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use indexmap::IndexMap;

use crate::capability::Capabilities;
use crate::error::{Error, Result};
use crate::handlers::{Callback, Listeners, Subscription};
use crate::platform::{LockHandle, MediaEvent, Platform, VideoElement};

/// Platform call recorded by the mocks for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAction {
	RequestWakeLock,
	ReleaseLock { id: usize },
	CreateVideo,
	AttachVideo,
	DetachVideo,
	Play,
	Pause,
	Seek { to: f64 },
	SetPlaybackRate { rate: f64 },
}

/// Scripted result of a wake-lock request.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
	Grant,
	Deny(Error),
	/// Stay pending until [`MockPlatform::settle_request`].
	Defer,
}

struct PlatformShared {
	caps: Cell<Capabilities>,
	visible: Cell<bool>,
	request_outcomes: RefCell<VecDeque<RequestOutcome>>,
	deferred: RefCell<VecDeque<oneshot::Sender<Result<()>>>>,
	locks: RefCell<Vec<MockLock>>,
	videos: RefCell<Vec<MockVideo>>,
	visibility: Listeners,
	fullscreen: Listeners,
	randoms: RefCell<VecDeque<f64>>,
	spawned: RefCell<VecDeque<LocalBoxFuture<'static, ()>>>,
	actions: Rc<RefCell<Vec<MockAction>>>,
}

/// In-memory [`Platform`] for tests. Clones share state.
#[derive(Clone)]
pub struct MockPlatform {
	shared: Rc<PlatformShared>,
}

impl MockPlatform {
	pub fn new(caps: Capabilities) -> Self {
		Self {
			shared: Rc::new(PlatformShared {
				caps: Cell::new(caps),
				visible: Cell::new(true),
				request_outcomes: RefCell::new(VecDeque::new()),
				deferred: RefCell::new(VecDeque::new()),
				locks: RefCell::new(Vec::new()),
				videos: RefCell::new(Vec::new()),
				visibility: Listeners::new(),
				fullscreen: Listeners::new(),
				randoms: RefCell::new(VecDeque::new()),
				spawned: RefCell::new(VecDeque::new()),
				actions: Rc::new(RefCell::new(Vec::new())),
			}),
		}
	}

	/// Browser tab exposing the screen wake-lock API.
	pub fn native() -> Self {
		Self::new(Capabilities {
			has_document: true,
			has_wake_lock: true,
			standalone: false,
		})
	}

	/// Browser without the wake-lock API.
	pub fn without_wake_lock() -> Self {
		Self::new(Capabilities {
			has_document: true,
			has_wake_lock: false,
			standalone: false,
		})
	}

	/// Installed app that advertises, but does not honor, the wake-lock API.
	pub fn standalone() -> Self {
		Self::new(Capabilities {
			has_document: true,
			has_wake_lock: true,
			standalone: true,
		})
	}

	/// No document or window.
	pub fn headless() -> Self {
		Self::new(Capabilities::default())
	}

	/// Queues the outcome of the next wake-lock request. Unscripted requests are granted.
	pub fn push_request_outcome(&self, outcome: RequestOutcome) {
		self.shared.request_outcomes.borrow_mut().push_back(outcome);
	}

	/// Settles the oldest deferred request.
	///
	/// Returns `false` if no request was pending.
	pub fn settle_request(&self, outcome: Result<()>) -> bool {
		match self.shared.deferred.borrow_mut().pop_front() {
			Some(tx) => tx.send(outcome).is_ok(),
			None => false,
		}
	}

	/// Queues values returned by [`Platform::random`]. Defaults to `0.5`.
	pub fn push_random(&self, value: f64) {
		self.shared.randoms.borrow_mut().push_back(value);
	}

	/// Changes visibility and dispatches `visibilitychange`.
	pub fn set_visible(&self, visible: bool) {
		self.shared.visible.set(visible);
		self.shared.visibility.emit();
	}

	/// Dispatches `fullscreenchange`.
	pub fn fire_fullscreen_change(&self) {
		self.shared.fullscreen.emit();
	}

	/// Runs spawned background tasks to completion, including ones they spawn.
	pub async fn run_spawned(&self) {
		loop {
			let next = self.shared.spawned.borrow_mut().pop_front();
			match next {
				Some(task) => task.await,
				None => break,
			}
		}
	}

	pub fn spawned_count(&self) -> usize {
		self.shared.spawned.borrow().len()
	}

	pub fn actions(&self) -> Vec<MockAction> {
		self.shared.actions.borrow().clone()
	}

	pub fn request_count(&self) -> usize {
		self.count(|action| matches!(action, MockAction::RequestWakeLock))
	}

	pub fn count(&self, predicate: impl Fn(&MockAction) -> bool) -> usize {
		self.shared.actions.borrow().iter().filter(|a| predicate(a)).count()
	}

	pub fn locks(&self) -> Vec<MockLock> {
		self.shared.locks.borrow().clone()
	}

	pub fn last_lock(&self) -> Option<MockLock> {
		self.shared.locks.borrow().last().cloned()
	}

	pub fn videos(&self) -> Vec<MockVideo> {
		self.shared.videos.borrow().clone()
	}

	pub fn video(&self) -> Option<MockVideo> {
		self.shared.videos.borrow().first().cloned()
	}

	/// Registered `visibilitychange` plus `fullscreenchange` listeners.
	pub fn page_listener_count(&self) -> usize {
		self.shared.visibility.len() + self.shared.fullscreen.len()
	}

	fn record(&self, action: MockAction) {
		self.shared.actions.borrow_mut().push(action);
	}

	fn issue_lock(&self) -> MockLock {
		let mut locks = self.shared.locks.borrow_mut();
		let lock = MockLock {
			shared: Rc::new(LockShared {
				id: locks.len(),
				released: Cell::new(false),
				listeners: Listeners::new(),
				actions: Rc::clone(&self.shared.actions),
			}),
		};
		locks.push(lock.clone());
		lock
	}
}

impl Platform for MockPlatform {
	type Lock = MockLock;
	type Video = MockVideo;

	fn capabilities(&self) -> Capabilities {
		self.shared.caps.get()
	}

	fn request_wake_lock(&self) -> LocalBoxFuture<'static, Result<MockLock>> {
		self.record(MockAction::RequestWakeLock);
		let outcome = self
			.shared
			.request_outcomes
			.borrow_mut()
			.pop_front()
			.unwrap_or(RequestOutcome::Grant);

		match outcome {
			RequestOutcome::Grant => Box::pin(future::ready(Ok(self.issue_lock()))),
			RequestOutcome::Deny(err) => Box::pin(future::ready(Err(err))),
			RequestOutcome::Defer => {
				let (tx, rx) = oneshot::channel();
				self.shared.deferred.borrow_mut().push_back(tx);
				let platform = self.clone();
				Box::pin(async move {
					match rx.await {
						Ok(Ok(())) => Ok(platform.issue_lock()),
						Ok(Err(err)) => Err(err),
						Err(_) => Err(Error::AcquisitionDenied {
							name: "AbortError".to_string(),
							message: "deferred request dropped".to_string(),
						}),
					}
				})
			}
		}
	}

	fn is_visible(&self) -> bool {
		self.shared.visible.get()
	}

	fn on_visibility_change(&self, callback: Callback) -> Subscription {
		self.shared.visibility.add(callback)
	}

	fn on_fullscreen_change(&self, callback: Callback) -> Subscription {
		self.shared.fullscreen.add(callback)
	}

	fn create_video(&self) -> Result<MockVideo> {
		self.record(MockAction::CreateVideo);
		let video = MockVideo::new(Rc::clone(&self.shared.actions));
		self.shared.videos.borrow_mut().push(video.clone());
		Ok(video)
	}

	fn random(&self) -> f64 {
		self.shared.randoms.borrow_mut().pop_front().unwrap_or(0.5)
	}

	fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
		self.shared.spawned.borrow_mut().push_back(future);
	}
}

struct LockShared {
	id: usize,
	released: Cell<bool>,
	listeners: Listeners,
	actions: Rc<RefCell<Vec<MockAction>>>,
}

/// Wake lock issued by [`MockPlatform`].
#[derive(Clone)]
pub struct MockLock {
	shared: Rc<LockShared>,
}

impl MockLock {
	pub fn id(&self) -> usize {
		self.shared.id
	}

	/// Simulates the platform releasing the lock, e.g. when the page is hidden.
	pub fn platform_release(&self) {
		if !self.shared.released.replace(true) {
			self.shared.listeners.emit();
		}
	}

	pub fn is_released(&self) -> bool {
		self.shared.released.get()
	}

	pub fn release_listener_count(&self) -> usize {
		self.shared.listeners.len()
	}
}

impl LockHandle for MockLock {
	fn release(&self) {
		self.shared
			.actions
			.borrow_mut()
			.push(MockAction::ReleaseLock { id: self.shared.id });
		self.platform_release();
	}

	fn released(&self) -> bool {
		self.shared.released.get()
	}

	fn on_release(&self, callback: Callback) -> Subscription {
		self.shared.listeners.add(callback)
	}
}

enum ScriptedPlay {
	Ready(Result<()>),
	Defer,
}

fn play_aborted() -> Error {
	Error::PlaybackDenied {
		name: "AbortError".to_string(),
		message: "The play() request was interrupted by a call to pause()".to_string(),
	}
}

struct VideoShared {
	attributes: RefCell<IndexMap<String, String>>,
	styles: RefCell<IndexMap<String, String>>,
	sources: RefCell<Vec<(String, String)>>,
	attached: Cell<bool>,
	muted: Cell<bool>,
	paused: Cell<bool>,
	looping: Cell<bool>,
	duration: Cell<f64>,
	current_time: Cell<f64>,
	playback_rate: Cell<f64>,
	error: RefCell<Option<String>>,
	play_outcomes: RefCell<VecDeque<ScriptedPlay>>,
	pending_play: RefCell<Option<oneshot::Sender<Result<()>>>>,
	listeners: RefCell<HashMap<MediaEvent, Listeners>>,
	actions: Rc<RefCell<Vec<MockAction>>>,
}

/// Video element created by [`MockPlatform`].
#[derive(Clone)]
pub struct MockVideo {
	shared: Rc<VideoShared>,
}

impl MockVideo {
	fn new(actions: Rc<RefCell<Vec<MockAction>>>) -> Self {
		Self {
			shared: Rc::new(VideoShared {
				attributes: RefCell::new(IndexMap::new()),
				styles: RefCell::new(IndexMap::new()),
				sources: RefCell::new(Vec::new()),
				attached: Cell::new(false),
				muted: Cell::new(false),
				paused: Cell::new(true),
				looping: Cell::new(false),
				duration: Cell::new(f64::NAN),
				current_time: Cell::new(0.0),
				playback_rate: Cell::new(1.0),
				error: RefCell::new(None),
				play_outcomes: RefCell::new(VecDeque::new()),
				pending_play: RefCell::new(None),
				listeners: RefCell::new(HashMap::new()),
				actions,
			}),
		}
	}

	fn record(&self, action: MockAction) {
		self.shared.actions.borrow_mut().push(action);
	}

	fn listeners(&self, event: MediaEvent) -> Listeners {
		self.shared
			.listeners
			.borrow_mut()
			.entry(event)
			.or_default()
			.clone()
	}

	/// Dispatches a media event to registered listeners.
	pub fn fire(&self, event: MediaEvent) {
		self.listeners(event).emit();
	}

	/// Reports clip metadata and dispatches `loadedmetadata`.
	pub fn load_metadata(&self, duration: f64) {
		self.shared.duration.set(duration);
		self.fire(MediaEvent::LoadedMetadata);
	}

	/// Moves the playhead and dispatches `timeupdate`.
	pub fn advance_to(&self, time: f64) {
		self.shared.current_time.set(time);
		self.fire(MediaEvent::TimeUpdate);
	}

	/// Simulates playback running to the end.
	pub fn end(&self) {
		self.shared.paused.set(true);
		self.fire(MediaEvent::Ended);
	}

	/// Simulates a media error; `paused` is the element state afterwards.
	pub fn fail(&self, message: &str, paused: bool) {
		*self.shared.error.borrow_mut() = Some(message.to_string());
		self.shared.paused.set(paused);
		self.fire(MediaEvent::Error);
	}

	/// Queues the outcome of the next `play()`. Unscripted calls succeed.
	pub fn push_play_outcome(&self, outcome: Result<()>) {
		self.shared
			.play_outcomes
			.borrow_mut()
			.push_back(ScriptedPlay::Ready(outcome));
	}

	/// Leaves the next `play()` pending until [`settle_play`](Self::settle_play).
	/// Pausing first rejects it with `AbortError`, as browsers do.
	pub fn defer_play(&self) {
		self.shared.play_outcomes.borrow_mut().push_back(ScriptedPlay::Defer);
	}

	/// Settles a deferred `play()`. Returns `false` if none was pending.
	pub fn settle_play(&self, outcome: Result<()>) -> bool {
		match self.shared.pending_play.borrow_mut().take() {
			Some(tx) => tx.send(outcome).is_ok(),
			None => false,
		}
	}

	pub fn play_pending(&self) -> bool {
		self.shared.pending_play.borrow().is_some()
	}

	pub fn attribute(&self, name: &str) -> Option<String> {
		self.shared.attributes.borrow().get(name).cloned()
	}

	pub fn style(&self, property: &str) -> Option<String> {
		self.shared.styles.borrow().get(property).cloned()
	}

	/// `(src, type)` pairs of the `<source>` children, in order.
	pub fn sources(&self) -> Vec<(String, String)> {
		self.shared.sources.borrow().clone()
	}

	pub fn is_attached(&self) -> bool {
		self.shared.attached.get()
	}

	pub fn is_muted(&self) -> bool {
		self.shared.muted.get()
	}

	pub fn is_looping(&self) -> bool {
		self.shared.looping.get()
	}

	pub fn playback_rate(&self) -> f64 {
		self.shared.playback_rate.get()
	}

	pub fn listener_count(&self) -> usize {
		self.shared.listeners.borrow().values().map(Listeners::len).sum()
	}

	/// Seek targets set through [`VideoElement::set_current_time`].
	pub fn seeks(&self) -> Vec<f64> {
		self.shared
			.actions
			.borrow()
			.iter()
			.filter_map(|action| match action {
				MockAction::Seek { to } => Some(*to),
				_ => None,
			})
			.collect()
	}
}

impl VideoElement for MockVideo {
	fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
		self.shared
			.attributes
			.borrow_mut()
			.insert(name.to_string(), value.to_string());
		Ok(())
	}

	fn set_muted(&self, muted: bool) {
		self.shared.muted.set(muted);
	}

	fn append_source(&self, src: &str, mime_type: &str) -> Result<()> {
		self.shared
			.sources
			.borrow_mut()
			.push((src.to_string(), mime_type.to_string()));
		Ok(())
	}

	fn set_style(&self, property: &str, value: &str) -> Result<()> {
		self.shared
			.styles
			.borrow_mut()
			.insert(property.to_string(), value.to_string());
		Ok(())
	}

	fn attach(&self) -> Result<()> {
		self.record(MockAction::AttachVideo);
		self.shared.attached.set(true);
		Ok(())
	}

	fn detach(&self) {
		self.record(MockAction::DetachVideo);
		self.shared.attached.set(false);
	}

	fn play(&self) -> LocalBoxFuture<'static, Result<()>> {
		self.record(MockAction::Play);
		let scripted = self
			.shared
			.play_outcomes
			.borrow_mut()
			.pop_front()
			.unwrap_or(ScriptedPlay::Ready(Ok(())));
		let outcome = match scripted {
			ScriptedPlay::Ready(outcome) => outcome,
			ScriptedPlay::Defer => {
				let (tx, rx) = oneshot::channel();
				*self.shared.pending_play.borrow_mut() = Some(tx);
				let shared = Rc::clone(&self.shared);
				return Box::pin(async move {
					let outcome = rx.await.unwrap_or_else(|_| Err(play_aborted()));
					if outcome.is_ok() {
						shared.paused.set(false);
					}
					outcome
				});
			}
		};
		if outcome.is_ok() {
			self.shared.paused.set(false);
		}
		Box::pin(future::ready(outcome))
	}

	fn pause(&self) {
		self.record(MockAction::Pause);
		if let Some(tx) = self.shared.pending_play.borrow_mut().take() {
			let _ = tx.send(Err(play_aborted()));
		}
		if !self.shared.paused.replace(true) {
			self.fire(MediaEvent::Pause);
		}
	}

	fn paused(&self) -> bool {
		self.shared.paused.get()
	}

	fn media_error(&self) -> Option<String> {
		self.shared.error.borrow().clone()
	}

	fn duration(&self) -> f64 {
		self.shared.duration.get()
	}

	fn current_time(&self) -> f64 {
		self.shared.current_time.get()
	}

	fn set_current_time(&self, time: f64) {
		self.record(MockAction::Seek { to: time });
		self.shared.current_time.set(time);
	}

	fn set_loop(&self, looping: bool) {
		self.shared.looping.set(looping);
	}

	fn set_playback_rate(&self, rate: f64) {
		self.record(MockAction::SetPlaybackRate { rate });
		self.shared.playback_rate.set(rate);
	}

	fn on(&self, event: MediaEvent, callback: Callback) -> Subscription {
		self.listeners(event).add(callback)
	}
}
