//! Error types for screen-wake operations.

use thiserror::Error;

/// Result type alias for screen-wake operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the wake strategies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// The no-op strategy was invoked outside a browser-like environment.
	#[error(
		"NoSleep is running in placeholder mode: no document or window is available, so the screen cannot be kept awake"
	)]
	Unsupported,

	/// The platform rejected the screen wake-lock request.
	#[error("Screen wake lock request denied ({name}): {message}")]
	AcquisitionDenied {
		/// Platform error name (e.g. "NotAllowedError")
		name: String,
		/// Human-readable error message
		message: String,
	},

	/// The hidden video refused to start playing.
	#[error("Video playback denied ({name}): {message}")]
	PlaybackDenied {
		/// Platform error name (e.g. "NotAllowedError" for autoplay policy)
		name: String,
		/// Human-readable error message
		message: String,
	},

	/// The video element reported an asynchronous media error.
	#[error("Media error: {message}")]
	Media { message: String },

	/// The instance was disposed and must not be reused.
	#[error("NoSleep instance has been disposed")]
	Disposed,

	/// The platform could not build or attach a DOM node.
	#[error("DOM error: {0}")]
	Dom(String),
}

impl Error {
	/// Returns true if this error comes from the no-op strategy.
	pub fn is_unsupported(&self) -> bool {
		matches!(self, Error::Unsupported)
	}

	/// Returns the platform error name for denial errors.
	pub fn error_name(&self) -> Option<&str> {
		match self {
			Error::AcquisitionDenied { name, .. } | Error::PlaybackDenied { name, .. } => Some(name),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_name_only_for_denials() {
		let denied = Error::AcquisitionDenied {
			name: "NotAllowedError".to_string(),
			message: "battery saver".to_string(),
		};
		assert_eq!(denied.error_name(), Some("NotAllowedError"));
		assert_eq!(Error::Unsupported.error_name(), None);
		assert_eq!(Error::Disposed.error_name(), None);
	}

	#[test]
	fn unsupported_message_names_placeholder_mode() {
		let err = Error::Unsupported;
		assert!(err.is_unsupported());
		assert!(err.to_string().contains("placeholder mode"));
	}
}
