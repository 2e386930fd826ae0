//! Media payloads for the hidden-video fallback.
//!
//! The clips themselves are opaque assets served next to the page (or inlined
//! as data URIs by the host). This module only names them.

/// Container format of a fallback clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
	Webm,
	Mp4,
}

impl MediaFormat {
	/// MIME type used for the `<source type>` attribute.
	pub fn mime_type(self) -> &'static str {
		match self {
			MediaFormat::Webm => "video/webm",
			MediaFormat::Mp4 => "video/mp4",
		}
	}

	/// Default asset path for this format, relative to the page.
	pub fn default_src(self) -> &'static str {
		match self {
			MediaFormat::Webm => "nosleep.webm",
			MediaFormat::Mp4 => "nosleep.mp4",
		}
	}
}

/// One `src` per container format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSources {
	pub webm: String,
	pub mp4: String,
}

impl MediaSources {
	/// Returns the source for `format`.
	pub fn src(&self, format: MediaFormat) -> &str {
		match format {
			MediaFormat::Webm => &self.webm,
			MediaFormat::Mp4 => &self.mp4,
		}
	}
}

impl Default for MediaSources {
	fn default() -> Self {
		Self {
			webm: MediaFormat::Webm.default_src().to_string(),
			mp4: MediaFormat::Mp4.default_src().to_string(),
		}
	}
}
