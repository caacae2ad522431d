//! Retry-loop behavior for single-element handles.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use common::FakeDriver;
use driver_port::Gestures;
use element_engine::{ElementHandle, EngineError, Timing};
use pagewright_core_types::{DriverError, Locator};

fn quick() -> Timing {
    Timing {
        element_wait: Duration::from_millis(200),
        poll: Duration::from_millis(10),
        resolve_probe: Duration::from_millis(40),
    }
}

fn handle(driver: &Arc<FakeDriver>, selector: &str) -> ElementHandle {
    ElementHandle::new(driver.clone(), Locator::css(selector)).with_timing(quick())
}

#[tokio::test]
async fn zero_budget_still_attempts_once() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#go", "btn");
    let mut go = handle(&driver, "#go").with_timeout(Duration::ZERO);

    go.click().await.unwrap();
    assert_eq!(driver.clicks("btn"), 1);
}

#[tokio::test]
async fn zero_budget_times_out_right_after_the_first_attempt() {
    let driver = Arc::new(FakeDriver::new());
    let mut missing = handle(&driver, "#missing").with_timeout(Duration::ZERO);

    let started = Instant::now();
    let err = missing.click().await.unwrap_err();

    assert!(matches!(err, EngineError::Timeout { .. }));
    assert!(driver.find_calls() >= 1);
    // one resolution probe plus one poll sleep; nowhere near a second window
    assert!(started.elapsed() < Duration::from_millis(150));
}

#[tokio::test]
async fn exhausted_budget_times_out_after_the_full_wait() {
    let driver = Arc::new(FakeDriver::new());
    let mut missing = handle(&driver, "#missing");

    let started = Instant::now();
    let err = missing.text().await.unwrap_err();

    assert!(matches!(err, EngineError::Timeout { .. }));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn fatal_resolution_failure_aborts_without_retry() {
    let driver = Arc::new(FakeDriver::new());
    driver.script_find("#boom", Err(DriverError::SessionLost("socket closed".into())));
    let mut doomed = handle(&driver, "#boom");

    let err = doomed.text().await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Driver(DriverError::SessionLost(_))
    ));
    assert_eq!(driver.find_calls(), 1);
}

#[tokio::test]
async fn fatal_action_failure_aborts_without_retry() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#go", "btn");
    driver.script_click("btn", Err(DriverError::Protocol("garbled frame".into())));
    let mut go = handle(&driver, "#go");

    let err = go.click().await.unwrap_err();

    assert!(matches!(err, EngineError::Driver(DriverError::Protocol(_))));
    assert_eq!(driver.clicks("btn"), 1);
}

#[tokio::test]
async fn intercepted_click_is_retried_until_it_lands() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#go", "btn");
    driver.script_click("btn", Err(DriverError::ClickIntercepted("overlay".into())));
    let mut go = handle(&driver, "#go");

    go.click().await.unwrap();
    assert_eq!(driver.clicks("btn"), 2);
}

#[tokio::test]
async fn stale_read_is_retried_against_the_fresh_element() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#label", "lbl");
    driver.script_text("lbl", Err(DriverError::Stale("re-rendered".into())));
    driver.set_text("lbl", "hello");
    let mut label = handle(&driver, "#label");

    assert_eq!(label.text().await.unwrap(), "hello");
    assert_eq!(driver.text_reads("lbl"), 2);
}

#[tokio::test]
async fn button_handles_wait_for_clickability() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#save", "save");
    driver.set_enabled("save", false);
    let mut save =
        ElementHandle::button(driver.clone(), Locator::css("#save")).with_timing(quick());

    let err = save.click().await.unwrap_err();
    assert!(matches!(err, EngineError::Timeout { .. }));
    assert_eq!(driver.clicks("save"), 0);
}

#[tokio::test]
async fn wait_text_sees_the_text_settle() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#status", "st");
    driver.script_text("st", Ok("loading"));
    driver.script_text("st", Ok("loading"));
    driver.set_text("st", "ready");
    let mut status = handle(&driver, "#status");

    assert!(status.wait_text(Some("ready")).await.unwrap());
}

#[tokio::test]
async fn wait_text_answers_false_instead_of_failing() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#status", "st");
    driver.set_text("st", "loading");
    let mut status = handle(&driver, "#status");

    assert!(!status.wait_text(Some("ready")).await.unwrap());
}

#[tokio::test]
async fn wait_text_changed_answers_false_on_a_static_page() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#clock", "ck");
    driver.set_text("ck", "12:00");
    let mut clock = handle(&driver, "#clock");

    assert!(!clock.wait_text_changed().await.unwrap());
}

#[tokio::test]
async fn wait_text_changed_sees_a_change() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#clock", "ck");
    driver.script_text("ck", Ok("12:00"));
    driver.set_text("ck", "12:01");
    let mut clock = handle(&driver, "#clock");

    assert!(clock.wait_text_changed().await.unwrap());
}

#[tokio::test]
async fn timeout_diagnostics_name_the_locator_and_action() {
    let driver = Arc::new(FakeDriver::new());
    let mut missing = handle(&driver, "#mia");

    let message = missing.text().await.unwrap_err().to_string();

    assert!(message.contains("#mia"), "got: {message}");
    assert!(message.contains("read text"), "got: {message}");
}

#[tokio::test]
async fn send_keys_reaches_the_resolved_element() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#q", "query");
    let mut query = handle(&driver, "#q");

    query.send_keys("retry loops").await.unwrap();
    assert_eq!(
        driver.keys_sent(),
        vec![("query".to_string(), "retry loops".to_string())]
    );
}

#[tokio::test]
async fn drag_to_replays_a_composed_gesture() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#card", "card");
    driver.set_element("#bin", "bin");
    let mut card = handle(&driver, "#card");
    let mut bin = handle(&driver, "#bin");

    card.drag_to(&mut bin).await.unwrap();

    let performed = driver.performed();
    assert_eq!(performed.len(), 1);
    assert_eq!(
        performed[0],
        Gestures::drag_and_drop(
            &driver_port::ElementRef("card".into()),
            &driver_port::ElementRef("bin".into())
        )
    );
}

#[tokio::test]
async fn right_click_replays_a_context_click() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#row", "row");
    let mut row = handle(&driver, "#row");

    row.right_click().await.unwrap();

    let performed = driver.performed();
    assert_eq!(performed.len(), 1);
    assert_eq!(
        performed[0],
        Gestures::context_click(&driver_port::ElementRef("row".into()))
    );
}

#[tokio::test]
async fn absent_for_reports_sustained_absence() {
    let driver = Arc::new(FakeDriver::new());
    let ghost = handle(&driver, "#ghost");
    assert!(ghost.absent_for(Duration::from_millis(50)).await.unwrap());

    driver.set_element("#ghost", "gh");
    let present = handle(&driver, "#ghost");
    assert!(!present.absent_for(Duration::from_millis(50)).await.unwrap());
}

#[tokio::test]
async fn present_until_holds_to_the_deadline() {
    let driver = Arc::new(FakeDriver::new());
    driver.set_element("#banner", "bn");
    let banner = handle(&driver, "#banner");

    let held = banner
        .present_until(Utc::now() + chrono::Duration::milliseconds(50))
        .await
        .unwrap();
    assert!(held);
}

#[tokio::test]
async fn present_until_reports_early_disappearance() {
    let driver = Arc::new(FakeDriver::new());
    driver.script_find("#banner", Ok("bn"));
    driver.script_find("#banner", Ok("bn"));
    let banner = handle(&driver, "#banner");

    let held = banner
        .present_until(Utc::now() + chrono::Duration::seconds(30))
        .await
        .unwrap();
    assert!(!held);
}
