//! Pure wake strategy selection.

/// Strategy used to keep the screen awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
	/// No document or window; every call fails.
	NoOp,
	/// Platform screen wake lock.
	Native,
	/// Hidden looping video.
	VideoFallback,
}

impl StrategyKind {
	/// Short name used in log fields.
	pub fn as_str(self) -> &'static str {
		match self {
			StrategyKind::NoOp => "noop",
			StrategyKind::Native => "native",
			StrategyKind::VideoFallback => "video",
		}
	}
}

/// Host environment facts used to select a [`StrategyKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
	/// Whether a document and window exist.
	pub has_document: bool,
	/// Whether the environment exposes a screen wake-lock API.
	pub has_wake_lock: bool,
	/// Whether the page runs as an installed, standalone app.
	///
	/// At least one mobile platform advertises the wake-lock API in this mode
	/// without honoring it.
	pub standalone: bool,
}

/// Resolves the wake strategy from host capabilities.
pub fn resolve_strategy(caps: Capabilities) -> StrategyKind {
	if !caps.has_document {
		StrategyKind::NoOp
	} else if caps.has_wake_lock && !caps.standalone {
		StrategyKind::Native
	} else {
		StrategyKind::VideoFallback
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn browser() -> Capabilities {
		Capabilities {
			has_document: true,
			has_wake_lock: true,
			standalone: false,
		}
	}

	#[test]
	fn native_when_wake_lock_available() {
		assert_eq!(resolve_strategy(browser()), StrategyKind::Native);
	}

	#[test]
	fn standalone_forces_video_fallback() {
		let mut caps = browser();
		caps.standalone = true;
		assert_eq!(resolve_strategy(caps), StrategyKind::VideoFallback);
	}

	#[test]
	fn missing_wake_lock_uses_video_fallback() {
		let mut caps = browser();
		caps.has_wake_lock = false;
		assert_eq!(resolve_strategy(caps), StrategyKind::VideoFallback);
	}

	#[test]
	fn no_document_wins_over_everything() {
		for has_wake_lock in [false, true] {
			for standalone in [false, true] {
				let caps = Capabilities {
					has_document: false,
					has_wake_lock,
					standalone,
				};
				assert_eq!(resolve_strategy(caps), StrategyKind::NoOp);
			}
		}
	}
}
