//! Tests for session log records.
//!
//! Records are captured through `tracing`'s `log` bridge with the shared
//! `logtest` logger, so these tests run serially.

mod common;

use common::{TestResult, open};
use log::Level;
use rstest::rstest;
use rtwire_testing::{LoggerHandle, logger};
use serial_test::serial;
use tokio::time;

#[rstest]
#[tokio::test]
#[serial(rtwire_logs)]
async fn dial_failures_are_logged_with_retry_delay(mut logger: LoggerHandle) -> TestResult {
    time::pause();
    logger.clear();
    let mut h = open();
    h.dialer.fail_next(1);
    let _end = h.connected().await;

    assert!(
        logger.drain_contains(Level::Warn, "dial failed"),
        "dial failure was not logged"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
#[serial(rtwire_logs)]
async fn malformed_frames_are_logged_and_discarded(mut logger: LoggerHandle) -> TestResult {
    time::pause();
    let mut h = open();
    let end = h.connected().await;
    logger.clear();

    end.send("9garbage");
    end.event("event:new", "{}");
    assert!(h.connection.incoming_messages().recv().await.is_some());
    assert!(
        logger.drain_contains(Level::Warn, "discarding malformed frame"),
        "malformed frame was not logged"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
#[serial(rtwire_logs)]
async fn close_is_logged(mut logger: LoggerHandle) -> TestResult {
    time::pause();
    let mut h = open();
    let _end = h.connected().await;
    logger.clear();

    h.connection.close();
    h.connection.closed().await;
    assert!(
        logger.drain_contains(Level::Info, "connection closed"),
        "close was not logged"
    );
    Ok(())
}
