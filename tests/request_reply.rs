//! Integration tests for correlated commands and their replies.

mod common;

use std::time::Duration;

use bytes::Bytes;
use common::{TestResult, open, open_with};
use rstest::rstest;
use rtwire::{ConnectionEvent, ConnectionOptions, IncomingMessage, SendError};
use serde_json::json;
use tokio::time::{self, Instant};

#[rstest]
#[tokio::test]
async fn auth_command_round_trip() -> TestResult {
    time::pause();
    let mut h = open();
    let mut end = h.connected().await;

    let pending = h.spawn_send("auth", json!({"authToken": "T"}));
    assert_eq!(
        end.recv_non_ping().await.as_deref(),
        Some(r#"421["auth",{"authToken":"T"}]"#)
    );
    end.reply(1, r#"["ok"]"#);

    assert_eq!(pending.await??, Bytes::from_static(br#"["ok"]"#));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn ids_increase_within_a_session() -> TestResult {
    time::pause();
    let mut h = open();
    let mut end = h.connected().await;

    for expected in 1..=3_u64 {
        let pending = h.spawn_send("subscribe", json!({"userIds": [expected]}));
        let frame = end.recv_non_ping().await.expect("command frame");
        assert!(
            frame.starts_with(&format!("42{expected}[")),
            "unexpected frame {frame}"
        );
        end.reply(expected, "[]");
        assert_eq!(pending.await??, Bytes::from_static(b"[]"));
    }
    Ok(())
}

#[rstest]
#[tokio::test]
async fn reply_timeout_leaves_session_healthy() -> TestResult {
    time::pause();
    let options = ConnectionOptions::default().reply_timeout(Duration::from_secs(5));
    let mut h = open_with(options);
    let mut end = h.connected().await;

    let start = Instant::now();
    let pending = h.spawn_send("auth", json!({"authToken": "T"}));
    assert!(end.recv_non_ping().await.is_some());
    let err = pending.await?.expect_err("no reply was sent");
    assert!(matches!(err, SendError::ReplyTimeout { timeout } if timeout == Duration::from_secs(5)));
    assert_eq!(start.elapsed(), Duration::from_secs(5));

    // The late reply lands on a closed slot and is dropped.
    end.reply(1, r#"["late"]"#);

    let pending = h.spawn_send("auth", json!({"authToken": "T"}));
    assert_eq!(
        end.recv_non_ping().await.as_deref(),
        Some(r#"422["auth",{"authToken":"T"}]"#)
    );
    end.reply(2, r#"["ok"]"#);
    assert_eq!(pending.await??, Bytes::from_static(br#"["ok"]"#));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn send_while_disconnected_times_out() -> TestResult {
    time::pause();
    let h = open();
    h.dialer.fail_next(1_000);

    let start = Instant::now();
    let err = h
        .connection
        .send("auth", &json!({}))
        .await
        .expect_err("no transport is up");
    assert!(err.is_timeout());
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn events_and_replies_interleave() -> TestResult {
    time::pause();
    let mut h = open();
    let mut end = h.connected().await;

    let pending = h.spawn_send("subscribe", json!({"postIds": [3]}));
    assert!(end.recv_non_ping().await.is_some());
    end.event("comment:new", r#"{"n":1}"#);
    end.reply(9, r#"["other"]"#);
    end.reply(1, r#"["subscribed"]"#);
    end.event("comment:new", r#"{"n":2}"#);

    assert_eq!(pending.await??, Bytes::from_static(br#"["subscribed"]"#));
    let first = h.connection.incoming_messages().recv().await;
    let second = h.connection.incoming_messages().recv().await;
    assert_eq!(
        first,
        Some(IncomingMessage::new("comment:new", &br#"{"n":1}"#[..]))
    );
    assert_eq!(
        second,
        Some(IncomingMessage::new("comment:new", &br#"{"n":2}"#[..]))
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn next_event_reports_connects_and_messages() -> TestResult {
    time::pause();
    let mut h = open();
    let end = h.server.accept().await;
    end.ack_connect();
    end.event("event:new", r#"{"id":"e1"}"#);

    assert_eq!(h.connection.next_event().await, Some(ConnectionEvent::Connected));
    let Some(ConnectionEvent::Message(message)) = h.connection.next_event().await else {
        panic!("expected a message event");
    };
    assert_eq!(message.event_type(), "event:new");
    let payload: serde_json::Value = message.decode_payload()?;
    assert_eq!(payload, json!({"id": "e1"}));

    h.connection.close();
    assert_eq!(h.connection.next_event().await, None);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn unserializable_payload_is_rejected_before_sending() -> TestResult {
    time::pause();
    let mut h = open();
    let mut end = h.connected().await;

    let mut payload = std::collections::HashMap::new();
    payload.insert(vec![1_u8], "non-string keys are not JSON");
    let err = h
        .connection
        .send("auth", &payload)
        .await
        .expect_err("map keys must be strings");
    assert!(matches!(err, SendError::Encode(_)));
    assert_eq!(end.try_recv(), None);
    Ok(())
}
