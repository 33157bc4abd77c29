//! End-to-end test of the WebSocket dialer against a local server.

mod common;

use std::time::Duration;

use common::TestResult;
use futures::{SinkExt, StreamExt};
use rstest::rstest;
use rtwire::{Connection, ConnectionOptions};
use serde_json::json;
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[rstest]
#[tokio::test]
async fn websocket_session_carries_events_and_replies() -> TestResult {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!(
        "ws://{}/socket.io/?EIO=3&transport=websocket",
        listener.local_addr()?
    );

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let mut ws = accept_async(stream).await?;
        ws.send(Message::text(r#"0{"sid":"s","pingInterval":25000,"pingTimeout":60000}"#))
            .await?;
        ws.send(Message::text("40")).await?;
        ws.send(Message::text(r#"42["event:new",{"id":"e1"}]"#))
            .await?;
        let command = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) if text.as_str() != "2" => break text.as_str().to_owned(),
                Some(Ok(_)) => {}
                other => return Err(format!("unexpected websocket item: {other:?}").into()),
            }
        };
        ws.send(Message::text(r#"431["ok"]"#)).await?;
        Ok::<_, Box<dyn std::error::Error + Send + Sync>>(command)
    });

    let mut connection = Connection::open(url, ConnectionOptions::default().label("e2e"));
    let wait = Duration::from_secs(10);
    assert_eq!(
        timeout(wait, connection.connect_notifications().recv()).await?,
        Some(())
    );
    let message = timeout(wait, connection.incoming_messages().recv())
        .await?
        .expect("event delivered");
    assert_eq!(message.event_type(), "event:new");

    let reply = timeout(wait, connection.send("auth", &json!({"authToken": "T"}))).await??;
    assert_eq!(reply.as_ref(), br#"["ok"]"#);
    assert_eq!(server.await??, r#"421["auth",{"authToken":"T"}]"#);

    connection.close();
    connection.closed().await;
    Ok(())
}
