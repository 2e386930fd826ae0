use serde::{Deserialize, Deserializer};

use crate::logging::LogSink;
use crate::media::{MediaFormat, MediaSources};

/// Title given to the hidden video when none is configured.
pub const DEFAULT_VIDEO_TITLE: &str = "No Sleep";

/// Which fallback clip formats to attach as `<source>` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSourceType {
	Webm,
	Mp4,
	/// Both formats, webm first.
	#[default]
	Both,
}

impl VideoSourceType {
	/// Parses a configuration value. Unrecognized values select [`VideoSourceType::Both`].
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"webm" => VideoSourceType::Webm,
			"mp4" => VideoSourceType::Mp4,
			_ => VideoSourceType::Both,
		}
	}

	/// Formats in attachment order.
	pub fn formats(self) -> &'static [MediaFormat] {
		match self {
			VideoSourceType::Webm => &[MediaFormat::Webm],
			VideoSourceType::Mp4 => &[MediaFormat::Mp4],
			VideoSourceType::Both => &[MediaFormat::Webm, MediaFormat::Mp4],
		}
	}
}

fn lenient_source_type<'de, D>(deserializer: D) -> Result<VideoSourceType, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(value
		.as_ref()
		.and_then(serde_json::Value::as_str)
		.map(VideoSourceType::parse)
		.unwrap_or_default())
}

/// Playback self-correction constants for the hidden video.
///
/// Clips no longer than `loop_max_duration` loop natively. Longer clips are
/// sought back to `random() * reset_span` whenever playback passes
/// `seek_threshold`, so they never reach their natural end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTuning {
	pub loop_max_duration: f64,
	pub seek_threshold: f64,
	pub reset_span: f64,
	/// Playback rate applied with each reset; `None` leaves the rate alone.
	pub playback_rate: Option<f64>,
}

impl PlaybackTuning {
	/// Full-range reset without throttling.
	pub fn legacy() -> Self {
		Self {
			reset_span: 1.0,
			playback_rate: None,
			..Self::default()
		}
	}
}

impl Default for PlaybackTuning {
	fn default() -> Self {
		Self {
			loop_max_duration: 1.0,
			seek_threshold: 0.5,
			reset_span: 0.5,
			playback_rate: Some(0.1),
		}
	}
}

/// Construction-time options.
///
/// Only the video fallback reads them. Deserializes from the camelCase
/// options object accepted by the JavaScript constructor; absent or
/// unrecognized values keep their defaults.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoSleepOptions {
	pub video_title: String,
	#[serde(deserialize_with = "lenient_source_type")]
	pub video_source_type: VideoSourceType,
	pub webm_src: Option<String>,
	pub mp4_src: Option<String>,
	#[serde(skip)]
	pub tuning: PlaybackTuning,
	#[serde(skip)]
	pub log_sink: Option<LogSink>,
}

impl NoSleepOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_video_title(mut self, title: impl Into<String>) -> Self {
		self.video_title = title.into();
		self
	}

	pub fn with_video_source_type(mut self, source_type: VideoSourceType) -> Self {
		self.video_source_type = source_type;
		self
	}

	pub fn with_source(mut self, format: MediaFormat, src: impl Into<String>) -> Self {
		match format {
			MediaFormat::Webm => self.webm_src = Some(src.into()),
			MediaFormat::Mp4 => self.mp4_src = Some(src.into()),
		}
		self
	}

	pub fn with_tuning(mut self, tuning: PlaybackTuning) -> Self {
		self.tuning = tuning;
		self
	}

	pub fn with_log_sink(mut self, sink: LogSink) -> Self {
		self.log_sink = Some(sink);
		self
	}

	/// Resolves configured sources over the default asset paths.
	pub fn sources(&self) -> MediaSources {
		let mut sources = MediaSources::default();
		if let Some(src) = self.webm_src.as_deref().filter(|s| !s.is_empty()) {
			sources.webm = src.to_string();
		}
		if let Some(src) = self.mp4_src.as_deref().filter(|s| !s.is_empty()) {
			sources.mp4 = src.to_string();
		}
		sources
	}
}

impl Default for NoSleepOptions {
	fn default() -> Self {
		Self {
			video_title: DEFAULT_VIDEO_TITLE.to_string(),
			video_source_type: VideoSourceType::default(),
			webm_src: None,
			mp4_src: None,
			tuning: PlaybackTuning::default(),
			log_sink: None,
		}
	}
}

impl std::fmt::Debug for NoSleepOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NoSleepOptions")
			.field("video_title", &self.video_title)
			.field("video_source_type", &self.video_source_type)
			.field("webm_src", &self.webm_src)
			.field("mp4_src", &self.mp4_src)
			.field("tuning", &self.tuning)
			.field("log_sink", &self.log_sink.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn defaults_use_both_formats_and_default_title() {
		let opts = NoSleepOptions::default();
		assert_eq!(opts.video_title, DEFAULT_VIDEO_TITLE);
		assert_eq!(opts.video_source_type.formats(), &[MediaFormat::Webm, MediaFormat::Mp4]);
		assert_eq!(opts.sources(), MediaSources::default());
		assert_eq!(opts.tuning, PlaybackTuning::default());
	}

	#[test]
	fn deserializes_camel_case_options() {
		let opts: NoSleepOptions = serde_json::from_value(json!({
			"videoTitle": "Keep awake",
			"videoSourceType": "mp4",
			"mp4Src": "data:video/mp4;base64,AAAA"
		}))
		.unwrap();
		assert_eq!(opts.video_title, "Keep awake");
		assert_eq!(opts.video_source_type, VideoSourceType::Mp4);
		assert_eq!(opts.sources().mp4, "data:video/mp4;base64,AAAA");
		assert_eq!(opts.sources().webm, "nosleep.webm");
	}

	#[test]
	fn unrecognized_source_type_falls_back_to_both() {
		for value in [json!("ogg"), json!(3), json!(null), json!(["webm"])] {
			let opts: NoSleepOptions = serde_json::from_value(json!({ "videoSourceType": value })).unwrap();
			assert_eq!(opts.video_source_type, VideoSourceType::Both);
		}
	}

	#[test]
	fn empty_object_yields_defaults() {
		let opts: NoSleepOptions = serde_json::from_value(json!({})).unwrap();
		assert_eq!(opts.video_title, DEFAULT_VIDEO_TITLE);
		assert_eq!(opts.video_source_type, VideoSourceType::Both);
	}

	#[test]
	fn legacy_tuning_is_full_range_unthrottled() {
		let tuning = PlaybackTuning::legacy();
		assert_eq!(tuning.reset_span, 1.0);
		assert_eq!(tuning.playback_rate, None);
		assert_eq!(tuning.seek_threshold, 0.5);
	}
}
