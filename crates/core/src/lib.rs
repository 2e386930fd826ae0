//! nosleep: keep the screen awake while a web page is active.
//!
//! [`NoSleep`] picks one of three strategies when it is constructed:
//!
//! - **Native**: the platform screen wake lock, re-acquired whenever the page
//!   becomes visible again after the platform released it.
//! - **Video fallback**: a hidden, muted video that keeps playing, for
//!   platforms without a usable wake lock.
//! - **No-op**: outside a browser, where every call fails with
//!   [`Error::Unsupported`].
//!
//! The crate never touches the DOM itself. Hosts implement [`Platform`] (the
//! `nosleep-web` crate does so with `web-sys`) and tests use
//! `testing::MockPlatform`, behind the `testing` feature.
//!
//! # Example
//!
//! ```ignore
//! use nosleep::{NoSleep, NoSleepOptions, VideoSourceType};
//!
//! let options = NoSleepOptions::new()
//!     .with_video_title("Presentation")
//!     .with_video_source_type(VideoSourceType::Mp4);
//! let no_sleep = NoSleep::new(platform, options)?;
//!
//! // Inside a click handler:
//! no_sleep.enable().await?;
//! ```

pub mod capability;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod media;
pub mod platform;
pub mod strategy;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

mod nosleep;

pub use capability::{Capabilities, StrategyKind, resolve_strategy};
pub use config::{DEFAULT_VIDEO_TITLE, NoSleepOptions, PlaybackTuning, VideoSourceType};
pub use error::{Error, Result};
pub use handlers::{Callback, Listeners, Subscription};
pub use logging::{LogCategory, LogEvent, LogLevel, LogSink, Logger};
pub use media::{MediaFormat, MediaSources};
pub use nosleep::NoSleep;
pub use platform::{LockHandle, MediaEvent, Platform, VideoElement};
