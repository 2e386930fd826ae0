//! Structured log events.
//!
//! Strategies log through a [`Logger`], which emits a `tracing` event and, if
//! the caller configured one, forwards a [`LogEvent`] to their [`LogSink`].

use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Debug,
	Info,
	Warn,
	Error,
}

impl LogLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
		}
	}
}

/// Component a [`LogEvent`] originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogCategory {
	NoSleep,
	WakeLock,
	Video,
}

impl LogCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			LogCategory::NoSleep => "NoSleep",
			LogCategory::WakeLock => "WakeLock",
			LogCategory::Video => "Video",
		}
	}
}

/// A log record handed to the caller's sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
	pub message: String,
	pub level: LogLevel,
	pub category: LogCategory,
	pub properties: Map<String, Value>,
}

/// Caller-supplied log callback.
pub type LogSink = Rc<dyn Fn(&LogEvent)>;

/// Emits `tracing` events and mirrors them to an optional [`LogSink`].
#[derive(Clone)]
pub struct Logger {
	category: LogCategory,
	sink: Option<LogSink>,
}

impl Logger {
	pub fn new(category: LogCategory, sink: Option<LogSink>) -> Self {
		Self { category, sink }
	}

	pub fn debug(&self, message: &str, properties: Value) {
		self.emit(LogLevel::Debug, message, properties);
	}

	pub fn info(&self, message: &str, properties: Value) {
		self.emit(LogLevel::Info, message, properties);
	}

	pub fn warn(&self, message: &str, properties: Value) {
		self.emit(LogLevel::Warn, message, properties);
	}

	pub fn error(&self, message: &str, properties: Value) {
		self.emit(LogLevel::Error, message, properties);
	}

	fn emit(&self, level: LogLevel, message: &str, properties: Value) {
		let category = self.category.as_str();
		match level {
			LogLevel::Debug => tracing::debug!(category, %properties, "{message}"),
			LogLevel::Info => tracing::info!(category, %properties, "{message}"),
			LogLevel::Warn => tracing::warn!(category, %properties, "{message}"),
			LogLevel::Error => tracing::error!(category, %properties, "{message}"),
		}

		if let Some(sink) = &self.sink {
			let properties = match properties {
				Value::Object(map) => map,
				Value::Null => Map::new(),
				other => {
					let mut map = Map::new();
					map.insert("value".to_string(), other);
					map
				}
			};
			sink(&LogEvent {
				message: message.to_string(),
				level,
				category: self.category,
				properties,
			});
		}
	}
}

impl std::fmt::Debug for Logger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Logger")
			.field("category", &self.category)
			.field("sink", &self.sink.is_some())
			.finish()
	}
}
