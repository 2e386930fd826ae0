use crate::error::{Error, Result};

/// Placeholder used when there is no document or window.
///
/// Calls fail loudly so that enabling outside a browser is noticed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpWakeLock;

impl NoOpWakeLock {
	pub fn is_enabled(&self) -> bool {
		false
	}

	/// # Errors
	///
	/// Always returns [`Error::Unsupported`].
	pub async fn enable(&self) -> Result<()> {
		tracing::warn!("enable() called without a document; NoSleep is a placeholder here");
		Err(Error::Unsupported)
	}

	/// # Errors
	///
	/// Always returns [`Error::Unsupported`].
	pub fn disable(&self) -> Result<()> {
		Err(Error::Unsupported)
	}
}
