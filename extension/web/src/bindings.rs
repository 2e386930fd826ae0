//! Screen Wake Lock API bindings.
//!
//! Declared here rather than taken from `web-sys`, where these types sit
//! behind `web_sys_unstable_apis`.

use js_sys::{Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Navigator;

#[wasm_bindgen]
extern "C" {
	/// `navigator.wakeLock`
	#[wasm_bindgen(extends = js_sys::Object)]
	pub type WakeLock;

	#[wasm_bindgen(method, catch)]
	pub fn request(this: &WakeLock, kind: &str) -> Result<Promise, JsValue>;

	/// Handle resolved by `navigator.wakeLock.request("screen")`.
	#[wasm_bindgen(extends = web_sys::EventTarget, extends = js_sys::Object)]
	pub type WakeLockSentinel;

	#[wasm_bindgen(method, getter)]
	pub fn released(this: &WakeLockSentinel) -> bool;

	#[wasm_bindgen(method)]
	pub fn release(this: &WakeLockSentinel) -> Promise;
}

/// Returns `navigator.wakeLock` when the browser exposes it.
pub fn wake_lock(navigator: &Navigator) -> Option<WakeLock> {
	Reflect::get(navigator, &JsValue::from_str("wakeLock"))
		.ok()
		.filter(|value| !value.is_undefined() && !value.is_null())
		.map(|value| value.unchecked_into::<WakeLock>())
}

/// Whether the page runs as an installed iOS home-screen app.
pub fn is_standalone(navigator: &Navigator) -> bool {
	Reflect::get(navigator, &JsValue::from_str("standalone"))
		.ok()
		.and_then(|value| value.as_bool())
		.unwrap_or(false)
}

/// Splits a rejection value into `(name, message)`.
pub fn describe_js_error(err: &JsValue) -> (String, String) {
	let field = |key: &str| {
		Reflect::get(err, &JsValue::from_str(key))
			.ok()
			.and_then(|v| v.as_string())
	};
	let name = field("name").unwrap_or_else(|| "Error".to_string());
	let message = field("message")
		.or_else(|| err.as_string())
		.or_else(|| js_sys::JSON::stringify(err).ok()?.as_string())
		.unwrap_or_else(|| format!("{err:?}"));
	(name, message)
}
