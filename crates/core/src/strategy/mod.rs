//! Interchangeable wake strategies.

/// Platform screen wake lock.
pub mod native;
/// Placeholder for environments without a document.
pub mod noop;
/// Hidden looping video.
pub mod video;

pub use native::NativeWakeLock;
pub use noop::NoOpWakeLock;
pub use video::VideoWakeLock;
