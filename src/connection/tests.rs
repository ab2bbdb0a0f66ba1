use std::time::Duration;

use tungstenite::protocol::Message as WsMessage;

use super::{Connection, Liveness};
use crate::utils::SendError;

const TIMEOUT: Duration = Duration::from_millis(50);

#[test]
fn test_open_assigns_unique_ids() {
    let (a, _out_a) = Connection::open(1, 4);
    let (b, _out_b) = Connection::open(1, 4);
    assert_ne!(a.id(), b.id());
    assert_eq!(a.topic(), 1);
    assert!(a.is_alive());
}

#[tokio::test]
async fn test_send_reaches_outbound() {
    let (conn, mut outbound) = Connection::open(7, 4);
    conn.send(WsMessage::text("hello"), TIMEOUT).await.unwrap();

    let frame = outbound.recv().await.expect("frame queued");
    assert_eq!(frame.to_text().unwrap(), "hello");
}

#[tokio::test]
async fn test_send_times_out_when_queue_full() {
    let (conn, _outbound) = Connection::open(7, 1);
    conn.send(WsMessage::text("first"), TIMEOUT).await.unwrap();

    let err = conn.send(WsMessage::text("second"), TIMEOUT).await.unwrap_err();
    assert_eq!(err, SendError::Timeout(TIMEOUT));
}

#[tokio::test]
async fn test_send_after_outbound_dropped_is_closed() {
    let (conn, outbound) = Connection::open(7, 4);
    drop(outbound);

    let err = conn.send(WsMessage::text("x"), TIMEOUT).await.unwrap_err();
    assert_eq!(err, SendError::Closed);
}

#[tokio::test]
async fn test_send_after_writer_failure() {
    let (conn, outbound) = Connection::open(7, 4);
    outbound.fail();

    assert_eq!(conn.liveness(), Liveness::Failed);
    let err = conn.send(WsMessage::text("x"), TIMEOUT).await.unwrap_err();
    assert_eq!(err, SendError::TransportFailure);
}

#[tokio::test]
async fn test_mark_removed_happens_once() {
    let (conn, _outbound) = Connection::open(7, 4);
    let weak = conn.downgrade();

    assert!(weak.mark_removed());
    assert!(!conn.mark_removed());
    assert_eq!(conn.liveness(), Liveness::Removed);
    assert_eq!(
        conn.send(WsMessage::text("x"), TIMEOUT).await.unwrap_err(),
        SendError::Closed
    );
}

#[tokio::test]
async fn test_removal_wakes_outbound() {
    let (conn, mut outbound) = Connection::open(7, 4);

    let writer = tokio::spawn(async move { outbound.recv().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    conn.mark_removed();

    let frame = tokio::time::timeout(Duration::from_secs(1), writer)
        .await
        .expect("writer woke up")
        .unwrap();
    assert!(frame.is_none());
}

#[tokio::test]
async fn test_closed_resolves_after_failure() {
    let (conn, outbound) = Connection::open(7, 4);
    let watcher = tokio::spawn({
        let conn = conn.clone();
        async move { conn.closed().await }
    });

    outbound.fail();
    tokio::time::timeout(Duration::from_secs(1), watcher)
        .await
        .expect("closed() resolved")
        .unwrap();
}

#[test]
fn test_weak_upgrade_fails_after_owner_dropped() {
    let (conn, _outbound) = Connection::open(3, 4);
    let weak = conn.downgrade();
    assert_eq!(weak.id(), conn.id());
    assert!(weak.upgrade().is_some());

    drop(conn);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_handles_share_identity_and_state() {
    let (conn, outbound) = Connection::open(11, 4);
    let weak = conn.downgrade();
    assert_eq!(outbound.id(), conn.id());
    assert_eq!(weak.topic(), conn.topic());
    assert!(weak.is_alive());

    outbound.fail();
    assert!(!conn.is_alive());
    assert!(!weak.is_alive());
    assert_eq!(conn.liveness(), Liveness::Failed);
}
