#![cfg(feature = "metrics")]
//! Tests for `rtwire` metrics helpers.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;
use rtwire::metrics::{self as rt_metrics, Direction};

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

#[rstest]
#[case(Direction::Outbound)]
#[case(Direction::Inbound)]
fn frame_metric_increments(#[case] direction: Direction) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || rt_metrics::inc_frames(direction));

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == rt_metrics::FRAMES_PROCESSED
            && k.key()
                .labels()
                .any(|l| l.key() == "direction" && l.value() == direction.as_str())
            && matches!(v, DebugValue::Counter(c) if *c > 0)
    });
    assert!(found, "{} frames metric not recorded", direction.as_str());
}

#[rstest]
#[case(rt_metrics::DIAL_FAILURES, rt_metrics::inc_dial_failures as fn(), 1)]
#[case(rt_metrics::FRAME_ERRORS, rt_metrics::inc_frame_errors as fn(), 2)]
#[case(rt_metrics::REPLY_TIMEOUTS, rt_metrics::inc_reply_timeouts as fn(), 3)]
fn failure_counters_count(#[case] name: &str, #[case] record: fn(), #[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || (0..expected).for_each(|_| record()));
    assert_counter_eq(&snapshotter, name, expected);
}

#[test]
fn session_gauge_tracks_live_sessions() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        rt_metrics::inc_sessions();
        rt_metrics::inc_sessions();
        rt_metrics::dec_sessions();
    });

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == rt_metrics::SESSIONS_ACTIVE
            && matches!(v, DebugValue::Gauge(g) if (g.into_inner() - 1.0).abs() < f64::EPSILON)
    });
    assert!(found, "session gauge not recorded: {metrics:#?}");
}

fn assert_counter_eq(snapshotter: &Snapshotter, name: &str, expected: u64) {
    let metrics = snapshotter.snapshot().into_vec();
    assert!(
        metrics.iter().any(|(key, _, _, value)| {
            key.key().name() == name && matches!(value, DebugValue::Counter(c) if *c == expected)
        }),
        "expected {name} == {expected}, got {metrics:#?}"
    );
}
