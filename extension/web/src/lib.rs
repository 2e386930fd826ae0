//! JavaScript surface of nosleep.
//!
//! ```js
//! import init, { NoSleep } from "nosleep-web";
//! await init();
//! const noSleep = new NoSleep({ videoTitle: "Presentation" });
//! button.addEventListener("click", () => noSleep.enable());
//! ```

mod bindings;
mod logging;
mod options;
mod platform;

use nosleep::{Error, NoSleep};
use wasm_bindgen::prelude::*;

pub use crate::platform::{WebLock, WebPlatform, WebVideo};

#[wasm_bindgen(start)]
pub fn start() {
	console_error_panic_hook::set_once();
}

/// Installs a console `tracing` subscriber. `level` is 0 (errors), 1 (info)
/// or 2+ (debug); it defaults to 1.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<u8>) {
	logging::init_logging(level.unwrap_or(1));
}

/// Maps a nosleep error to a JavaScript `Error` whose `name` mirrors the
/// underlying DOM exception where there is one.
fn to_js_error(err: &Error) -> JsValue {
	let js_err = js_sys::Error::new(&err.to_string());
	let name = match err {
		Error::Unsupported => "NotSupportedError",
		Error::Disposed => "InvalidStateError",
		other => other.error_name().unwrap_or("Error"),
	};
	js_err.set_name(name);
	js_err.into()
}

/// `new NoSleep(options?)`
#[wasm_bindgen(js_name = NoSleep)]
pub struct WasmNoSleep {
	inner: NoSleep<WebPlatform>,
}

#[wasm_bindgen(js_class = NoSleep)]
impl WasmNoSleep {
	#[wasm_bindgen(constructor)]
	pub fn new(options: JsValue) -> Result<WasmNoSleep, JsValue> {
		let options = options::parse_options(&options);
		let inner = NoSleep::new(WebPlatform::detect(), options).map_err(|err| to_js_error(&err))?;
		Ok(Self { inner })
	}

	#[wasm_bindgen(getter, js_name = isEnabled)]
	pub fn is_enabled(&self) -> bool {
		self.inner.is_enabled()
	}

	/// `"native"`, `"video"` or `"noop"`.
	#[wasm_bindgen(getter)]
	pub fn strategy(&self) -> String {
		self.inner.kind().as_str().to_string()
	}

	/// Resolves once the screen is kept awake. Call from a user gesture.
	pub fn enable(&self) -> js_sys::Promise {
		let inner = self.inner.clone();
		wasm_bindgen_futures::future_to_promise(async move {
			inner.enable().await.map_err(|err| to_js_error(&err))?;
			Ok(JsValue::UNDEFINED)
		})
	}

	pub fn disable(&self) -> Result<(), JsValue> {
		self.inner.disable().map_err(|err| to_js_error(&err))
	}

	pub fn dispose(&self) {
		self.inner.dispose();
	}
}

/// Builds a `NoSleep` that always uses the hidden-video fallback.
#[wasm_bindgen(js_name = createVideoFallback)]
pub fn create_video_fallback(options: JsValue) -> Result<WasmNoSleep, JsValue> {
	let options = options::parse_options(&options);
	let inner =
		NoSleep::video_fallback(WebPlatform::detect(), options).map_err(|err| to_js_error(&err))?;
	Ok(WasmNoSleep { inner })
}
