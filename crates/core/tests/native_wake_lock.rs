use std::cell::RefCell;
use std::rc::Rc;

use nosleep::testing::{MockAction, MockPlatform, RequestOutcome};
use nosleep::{Error, LogEvent, LogLevel, LogSink, NoSleep, NoSleepOptions, StrategyKind};

fn denied() -> Error {
	Error::AcquisitionDenied {
		name: "NotAllowedError".to_string(),
		message: "battery saver is on".to_string(),
	}
}

fn native() -> (MockPlatform, NoSleep<MockPlatform>) {
	let platform = MockPlatform::native();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();
	assert_eq!(no_sleep.kind(), StrategyKind::Native);
	(platform, no_sleep)
}

#[tokio::test]
async fn enable_acquires_lock() {
	let (platform, no_sleep) = native();
	assert!(!no_sleep.is_enabled());

	no_sleep.enable().await.unwrap();

	assert!(no_sleep.is_enabled());
	assert_eq!(platform.request_count(), 1);
	assert_eq!(platform.last_lock().unwrap().release_listener_count(), 1);
}

#[tokio::test]
async fn enable_while_active_does_not_request_again() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();
	no_sleep.enable().await.unwrap();
	assert_eq!(platform.request_count(), 1);
}

#[tokio::test]
async fn failed_enable_reports_error_and_stays_disabled() {
	let (platform, no_sleep) = native();
	platform.push_request_outcome(RequestOutcome::Deny(denied()));

	let err = no_sleep.enable().await.unwrap_err();

	assert_eq!(err.error_name(), Some("NotAllowedError"));
	assert!(!no_sleep.is_enabled());
	assert!(platform.locks().is_empty());
}

#[tokio::test]
async fn failed_enable_is_logged_to_sink() {
	let events = Rc::new(RefCell::new(Vec::<LogEvent>::new()));
	let events_clone = Rc::clone(&events);
	let sink: LogSink = Rc::new(move |event: &LogEvent| events_clone.borrow_mut().push(event.clone()));

	let platform = MockPlatform::native();
	let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::new().with_log_sink(sink)).unwrap();
	platform.push_request_outcome(RequestOutcome::Deny(denied()));
	let _ = no_sleep.enable().await;

	let events = events.borrow();
	assert!(events.iter().any(|e| e.level == LogLevel::Warn && e.properties.contains_key("error")));
}

#[tokio::test]
async fn disable_releases_and_is_idempotent() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();
	let lock = platform.last_lock().unwrap();

	for _ in 0..3 {
		no_sleep.disable().unwrap();
		assert!(!no_sleep.is_enabled());
	}

	assert!(lock.is_released());
	assert_eq!(platform.count(|a| matches!(a, MockAction::ReleaseLock { .. })), 1);
}

#[tokio::test]
async fn disable_without_enable_is_harmless() {
	let (platform, no_sleep) = native();
	no_sleep.disable().unwrap();
	no_sleep.disable().unwrap();
	assert!(!no_sleep.is_enabled());
	assert!(platform.actions().is_empty());
}

#[tokio::test]
async fn platform_release_clears_enabled() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	platform.last_lock().unwrap().platform_release();

	assert!(!no_sleep.is_enabled());
}

#[tokio::test]
async fn visible_again_after_release_reacquires_once() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	platform.set_visible(false);
	platform.last_lock().unwrap().platform_release();
	platform.set_visible(true);
	platform.fire_fullscreen_change();
	assert_eq!(platform.spawned_count(), 1);

	platform.run_spawned().await;

	assert_eq!(platform.request_count(), 2);
	assert_eq!(platform.locks().len(), 2);
	assert!(no_sleep.is_enabled());
}

#[tokio::test]
async fn no_reacquire_after_explicit_disable() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	platform.last_lock().unwrap().platform_release();
	no_sleep.disable().unwrap();
	platform.set_visible(true);
	platform.run_spawned().await;

	assert_eq!(platform.request_count(), 1);
	assert!(!no_sleep.is_enabled());
}

#[tokio::test]
async fn disable_after_reacquire_is_scheduled_cancels_it() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	platform.last_lock().unwrap().platform_release();
	platform.set_visible(true);
	assert_eq!(platform.spawned_count(), 1);

	no_sleep.disable().unwrap();
	platform.run_spawned().await;

	assert_eq!(platform.request_count(), 1);
	assert!(!no_sleep.is_enabled());
}

#[tokio::test]
async fn explicit_enable_supersedes_scheduled_reacquire() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	platform.last_lock().unwrap().platform_release();
	platform.set_visible(true);
	no_sleep.enable().await.unwrap();
	platform.run_spawned().await;

	assert_eq!(platform.request_count(), 2);
	assert!(no_sleep.is_enabled());
	assert!(!platform.last_lock().unwrap().is_released());
}

#[tokio::test]
async fn no_reacquire_while_hidden_or_still_held() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	// Still held: visibility changes are ignored.
	platform.set_visible(true);
	platform.run_spawned().await;
	assert_eq!(platform.request_count(), 1);

	// Released while hidden: nothing until visible.
	platform.last_lock().unwrap().platform_release();
	platform.set_visible(false);
	platform.fire_fullscreen_change();
	assert_eq!(platform.spawned_count(), 0);
}

#[tokio::test]
async fn background_reacquire_failure_is_swallowed() {
	let (platform, no_sleep) = native();
	no_sleep.enable().await.unwrap();

	platform.last_lock().unwrap().platform_release();
	platform.push_request_outcome(RequestOutcome::Deny(denied()));
	platform.set_visible(true);
	platform.run_spawned().await;

	assert_eq!(platform.request_count(), 2);
	assert!(!no_sleep.is_enabled());
}

#[tokio::test]
async fn disable_during_pending_enable_wins() {
	let (platform, no_sleep) = native();
	platform.push_request_outcome(RequestOutcome::Defer);

	let pending = no_sleep.clone();
	let enable = tokio::task::LocalSet::new();
	let result = enable
		.run_until(async move {
			let task = tokio::task::spawn_local(async move { pending.enable().await });
			while platform.request_count() == 0 {
				tokio::task::yield_now().await;
			}

			no_sleep.disable().unwrap();
			assert!(platform.settle_request(Ok(())));
			let result = task.await.unwrap();

			assert!(!no_sleep.is_enabled());
			let lock = platform.last_lock().unwrap();
			assert!(lock.is_released());
			result
		})
		.await;

	assert!(result.is_ok());
}

#[tokio::test]
async fn dispose_removes_listeners_and_releases() {
	let (platform, no_sleep) = native();
	assert_eq!(platform.page_listener_count(), 2);
	no_sleep.enable().await.unwrap();

	no_sleep.dispose();
	no_sleep.dispose();

	assert_eq!(platform.page_listener_count(), 0);
	assert!(platform.last_lock().unwrap().is_released());
	assert!(!no_sleep.is_enabled());
	assert_eq!(no_sleep.enable().await.unwrap_err(), Error::Disposed);
}

#[tokio::test]
async fn repeated_create_dispose_does_not_leak_listeners() {
	let platform = MockPlatform::native();
	for _ in 0..5 {
		let no_sleep = NoSleep::new(platform.clone(), NoSleepOptions::default()).unwrap();
		no_sleep.enable().await.unwrap();
		no_sleep.dispose();
	}
	assert_eq!(platform.page_listener_count(), 0);
}
