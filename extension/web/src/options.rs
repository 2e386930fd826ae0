//! Conversion of the JavaScript options object.

use std::rc::Rc;

use js_sys::{Function, Reflect};
use nosleep::{LogEvent, LogSink, NoSleepOptions};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Reads `{ videoTitle, videoSourceType, webmSrc, mp4Src, onLogEvent }`.
///
/// `undefined` and `null` give the defaults. A malformed object is logged
/// and also falls back to the defaults rather than failing construction.
pub fn parse_options(value: &JsValue) -> NoSleepOptions {
	if value.is_undefined() || value.is_null() {
		return NoSleepOptions::default();
	}

	let mut options = match serde_wasm_bindgen::from_value::<NoSleepOptions>(value.clone()) {
		Ok(options) => options,
		Err(err) => {
			tracing::warn!(error = %err, "ignoring malformed NoSleep options");
			NoSleepOptions::default()
		}
	};

	if let Some(callback) = log_callback(value) {
		options = options.with_log_sink(js_log_sink(callback));
	}
	options
}

fn log_callback(value: &JsValue) -> Option<Function> {
	Reflect::get(value, &JsValue::from_str("onLogEvent"))
		.ok()?
		.dyn_into::<Function>()
		.ok()
}

/// Wraps `onLogEvent(message, level, category, properties)` as a [`LogSink`].
fn js_log_sink(callback: Function) -> LogSink {
	Rc::new(move |event: &LogEvent| {
		let serializer = serde_wasm_bindgen::Serializer::json_compatible();
		let properties = event
			.properties
			.serialize(&serializer)
			.unwrap_or(JsValue::UNDEFINED);
		let args = js_sys::Array::of4(
			&JsValue::from_str(&event.message),
			&JsValue::from_str(event.level.as_str()),
			&JsValue::from_str(event.category.as_str()),
			&properties,
		);
		// A throwing sink is ignored.
		if let Err(err) = callback.apply(&JsValue::NULL, &args) {
			tracing::debug!(error = ?err, "onLogEvent threw");
		}
	})
}
