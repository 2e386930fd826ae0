//! `web-sys` implementation of the nosleep platform seam.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use nosleep::handlers::next_handler_id;
use nosleep::{
	Callback, Capabilities, Error, LockHandle, MediaEvent, Platform, Result, Subscription,
	VideoElement,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	Document, Event, EventTarget, HtmlSourceElement, HtmlVideoElement, Navigator, VisibilityState,
	Window,
};

use crate::bindings::{self, WakeLockSentinel, describe_js_error};

/// Adds a DOM listener that lives as long as the returned [`Subscription`].
fn listen(target: &EventTarget, event: &'static str, mut callback: Callback) -> Subscription {
	let closure = Closure::<dyn FnMut(Event)>::new(move |_: Event| callback());
	if let Err(err) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
		tracing::warn!(event, error = ?err, "addEventListener failed");
	}

	let target = target.clone();
	Subscription::new(next_handler_id(), move |_| {
		let _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
		drop(closure);
	})
}

fn dom_error(context: &str, err: JsValue) -> Error {
	let (name, message) = describe_js_error(&err);
	Error::Dom(format!("{context}: {name}: {message}"))
}

/// The browser window, if there is one.
#[derive(Clone)]
pub struct WebPlatform {
	window: Option<Window>,
	document: Option<Document>,
}

impl WebPlatform {
	/// Inspects the global scope. Outside a window (workers, server rendering)
	/// the platform reports no document.
	pub fn detect() -> Self {
		let window = web_sys::window();
		let document = window.as_ref().and_then(Window::document);
		Self { window, document }
	}

	fn navigator(&self) -> Option<Navigator> {
		self.window.as_ref().map(Window::navigator)
	}

	fn document(&self) -> Result<&Document> {
		self.document
			.as_ref()
			.ok_or_else(|| Error::Dom("no document available".to_string()))
	}

	fn listen_document(&self, event: &'static str, callback: Callback) -> Subscription {
		match &self.document {
			Some(document) => listen(document, event, callback),
			None => Subscription::new(next_handler_id(), |_| {}),
		}
	}
}

impl Platform for WebPlatform {
	type Lock = WebLock;
	type Video = WebVideo;

	fn capabilities(&self) -> Capabilities {
		let navigator = self.navigator();
		Capabilities {
			has_document: self.document.is_some(),
			has_wake_lock: navigator.as_ref().and_then(bindings::wake_lock).is_some(),
			standalone: navigator.as_ref().is_some_and(bindings::is_standalone),
		}
	}

	fn request_wake_lock(&self) -> LocalBoxFuture<'static, Result<WebLock>> {
		let request = self
			.navigator()
			.as_ref()
			.and_then(bindings::wake_lock)
			.map(|wake_lock| wake_lock.request("screen"));

		Box::pin(async move {
			let denied = |err: JsValue| {
				let (name, message) = describe_js_error(&err);
				Error::AcquisitionDenied { name, message }
			};
			let promise = match request {
				Some(Ok(promise)) => promise,
				Some(Err(err)) => return Err(denied(err)),
				None => {
					return Err(Error::AcquisitionDenied {
						name: "NotSupportedError".to_string(),
						message: "navigator.wakeLock is not available".to_string(),
					});
				}
			};
			let sentinel = JsFuture::from(promise).await.map_err(denied)?;
			Ok(WebLock {
				sentinel: sentinel.unchecked_into(),
			})
		})
	}

	fn is_visible(&self) -> bool {
		self.document
			.as_ref()
			.is_some_and(|document| document.visibility_state() == VisibilityState::Visible)
	}

	fn on_visibility_change(&self, callback: Callback) -> Subscription {
		self.listen_document("visibilitychange", callback)
	}

	fn on_fullscreen_change(&self, callback: Callback) -> Subscription {
		let callback = Rc::new(RefCell::new(callback));
		let shared = |callback: &Rc<RefCell<Callback>>| -> Callback {
			let callback = Rc::clone(callback);
			Box::new(move || {
				if let Ok(mut callback) = callback.try_borrow_mut() {
					callback();
				}
			})
		};
		// Safari still only fires the prefixed event.
		let standard = self.listen_document("fullscreenchange", shared(&callback));
		let prefixed = self.listen_document("webkitfullscreenchange", shared(&callback));
		Subscription::new(next_handler_id(), move |_| {
			drop(standard);
			drop(prefixed);
		})
	}

	fn create_video(&self) -> Result<WebVideo> {
		let document = self.document()?.clone();
		let element = document
			.create_element("video")
			.map_err(|err| dom_error("createElement(video)", err))?
			.dyn_into::<HtmlVideoElement>()
			.map_err(|_| Error::Dom("created element is not a video".to_string()))?;
		Ok(WebVideo { element, document })
	}

	fn random(&self) -> f64 {
		js_sys::Math::random()
	}

	fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
		wasm_bindgen_futures::spawn_local(future);
	}
}

/// A held `WakeLockSentinel`.
pub struct WebLock {
	sentinel: WakeLockSentinel,
}

impl LockHandle for WebLock {
	fn release(&self) {
		let release = JsFuture::from(self.sentinel.release());
		wasm_bindgen_futures::spawn_local(async move {
			if let Err(err) = release.await {
				let (name, message) = describe_js_error(&err);
				tracing::warn!(%name, %message, "WakeLockSentinel.release() failed");
			}
		});
	}

	fn released(&self) -> bool {
		self.sentinel.released()
	}

	fn on_release(&self, callback: Callback) -> Subscription {
		listen(&self.sentinel, "release", callback)
	}
}

/// The hidden `<video>` element.
pub struct WebVideo {
	element: HtmlVideoElement,
	document: Document,
}

impl VideoElement for WebVideo {
	fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
		self.element
			.set_attribute(name, value)
			.map_err(|err| dom_error("setAttribute", err))
	}

	fn set_muted(&self, muted: bool) {
		self.element.set_muted(muted);
	}

	fn append_source(&self, src: &str, mime_type: &str) -> Result<()> {
		let source = self
			.document
			.create_element("source")
			.map_err(|err| dom_error("createElement(source)", err))?
			.dyn_into::<HtmlSourceElement>()
			.map_err(|_| Error::Dom("created element is not a source".to_string()))?;
		source.set_src(src);
		source.set_type(mime_type);
		self.element
			.append_child(&source)
			.map_err(|err| dom_error("appendChild(source)", err))?;
		Ok(())
	}

	fn set_style(&self, property: &str, value: &str) -> Result<()> {
		self.element
			.style()
			.set_property(property, value)
			.map_err(|err| dom_error("style.setProperty", err))
	}

	fn attach(&self) -> Result<()> {
		let body = self
			.document
			.body()
			.ok_or_else(|| Error::Dom("document has no body".to_string()))?;
		body.append_child(&self.element)
			.map_err(|err| dom_error("appendChild(video)", err))?;
		Ok(())
	}

	fn detach(&self) {
		self.element.remove();
	}

	fn play(&self) -> LocalBoxFuture<'static, Result<()>> {
		let play = self.element.play();
		Box::pin(async move {
			let denied = |err: JsValue| {
				let (name, message) = describe_js_error(&err);
				Error::PlaybackDenied { name, message }
			};
			JsFuture::from(play.map_err(denied)?)
				.await
				.map_err(denied)?;
			Ok(())
		})
	}

	fn pause(&self) {
		if let Err(err) = self.element.pause() {
			tracing::warn!(error = ?err, "video.pause() failed");
		}
	}

	fn paused(&self) -> bool {
		self.element.paused()
	}

	fn media_error(&self) -> Option<String> {
		self.element
			.error()
			.map(|err| format!("code {}: {}", err.code(), err.message()))
	}

	fn duration(&self) -> f64 {
		self.element.duration()
	}

	fn current_time(&self) -> f64 {
		self.element.current_time()
	}

	fn set_current_time(&self, time: f64) {
		self.element.set_current_time(time);
	}

	fn set_loop(&self, looping: bool) {
		self.element.set_loop(looping);
	}

	fn set_playback_rate(&self, rate: f64) {
		self.element.set_playback_rate(rate);
	}

	fn on(&self, event: MediaEvent, callback: Callback) -> Subscription {
		listen(&self.element, event.as_str(), callback)
	}
}
