use std::cell::RefCell;
use std::rc::Rc;

use nosleep::testing::MockPlatform;
use nosleep::{LogCategory, LogEvent, LogLevel, LogSink, NoSleep, NoSleepOptions, StrategyKind};

#[tokio::test]
async fn native_context_reacquires_after_release_and_visibility() {
	let platform = MockPlatform::native();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();
	assert_eq!(no_sleep.kind(), StrategyKind::Native);
	assert!(platform.videos().is_empty());

	no_sleep.enable().await.unwrap();
	assert!(no_sleep.is_enabled());

	platform.last_lock().unwrap().platform_release();
	platform.set_visible(true);
	platform.run_spawned().await;

	assert_eq!(platform.request_count(), 2);
	assert!(no_sleep.is_enabled());
}

#[tokio::test]
async fn missing_wake_lock_attaches_video_with_both_sources() {
	let platform = MockPlatform::without_wake_lock();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();

	assert_eq!(no_sleep.kind(), StrategyKind::VideoFallback);
	let video = platform.video().unwrap();
	assert!(video.is_attached());
	let types: Vec<_> = video.sources().into_iter().map(|(_, t)| t).collect();
	assert_eq!(types, ["video/webm", "video/mp4"]);
}

#[tokio::test]
async fn mp4_source_type_attaches_single_source() {
	let platform = MockPlatform::without_wake_lock();
	let options: NoSleepOptions =
		serde_json::from_value(serde_json::json!({ "videoSourceType": "mp4" })).unwrap();
	let _no_sleep = NoSleep::new(platform.clone(), options).unwrap();

	let sources = platform.video().unwrap().sources();
	assert_eq!(sources.len(), 1);
	assert_eq!(sources[0].1, "video/mp4");
}

#[tokio::test]
async fn standalone_mode_uses_video_even_with_wake_lock() {
	let platform = MockPlatform::standalone();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();

	assert_eq!(no_sleep.kind(), StrategyKind::VideoFallback);
	no_sleep.enable().await.unwrap();
	assert_eq!(platform.request_count(), 0);
}

#[tokio::test]
async fn headless_context_fails_loudly() {
	let platform = MockPlatform::headless();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();

	assert_eq!(no_sleep.kind(), StrategyKind::NoOp);
	assert!(no_sleep.enable().await.unwrap_err().is_unsupported());
	assert!(no_sleep.disable().unwrap_err().is_unsupported());
	assert!(!no_sleep.is_enabled());
	no_sleep.dispose();
	assert!(platform.actions().is_empty());
}

#[tokio::test]
async fn clones_share_one_strategy() {
	let platform = MockPlatform::native();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();
	let other = no_sleep.clone();

	other.enable().await.unwrap();
	assert!(no_sleep.is_enabled());

	no_sleep.disable().unwrap();
	assert!(!other.is_enabled());
	assert_eq!(platform.page_listener_count(), 2);
}

#[tokio::test]
async fn strategy_selection_is_logged_at_info() {
	let events = Rc::new(RefCell::new(Vec::<LogEvent>::new()));
	let events_clone = Rc::clone(&events);
	let sink: LogSink = Rc::new(move |event: &LogEvent| events_clone.borrow_mut().push(event.clone()));

	let _no_sleep = NoSleep::new(MockPlatform::native(), NoSleepOptions::new().with_log_sink(sink)).unwrap();

	let events = events.borrow();
	let selected = &events[0];
	assert_eq!(selected.level, LogLevel::Info);
	assert_eq!(selected.category, LogCategory::NoSleep);
	assert_eq!(selected.properties["strategy"], "native");
}
