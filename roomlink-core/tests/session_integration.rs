/*
    session_integration.rs - Host session integration tests

    Exercises the coordinator, join code manager, and message router
    together over the in-memory channel: pairing lifecycle, rotation
    guarantees, acknowledgment correlation, and presence-driven cleanup.
*/

use roomlink_core::{
    message_types, Availability, ChannelError, ConnectOptions, ConnectionState, MemoryChannel,
    PeerAddress, RemoteControlEvent, RemoteControlHost, SessionError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

fn new_host() -> (RemoteControlHost, Arc<MemoryChannel>) {
    let channel = Arc::new(MemoryChannel::new("meet123"));
    let host = RemoteControlHost::new(channel.clone());
    (host, channel)
}

fn refresh_options(secs: u64) -> ConnectOptions {
    ConnectOptions {
        join_code_refresh: Some(Duration::from_secs(secs)),
    }
}

/// Let the dispatch loop drain injected events. Virtual time in paused
/// tests, a short real wait otherwise.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn test_join_code_is_room_plus_lock() {
    let (host, channel) = new_host();
    assert_eq!(host.join_code(), "");

    host.connect(ConnectOptions::default()).await.unwrap();
    assert_eq!(host.join_code(), "meet123");

    host.refresh_join_code(None).await.unwrap();
    let lock = channel.current_lock();
    assert_eq!(lock.len(), 3);
    assert_eq!(host.join_code(), format!("meet123{}", lock));

    // Unchanged lock, unchanged join code
    assert_eq!(host.join_code(), format!("meet123{}", lock));
}

#[tokio::test(start_paused = true)]
async fn test_connect_with_refresh_starts_rotation_loop() {
    let (host, channel) = new_host();
    let mut events = host.subscribe();

    host.connect(refresh_options(10)).await.unwrap();
    assert_eq!(channel.set_lock_calls(), 1);

    // Exactly one notification per rotation
    assert!(events.try_recv().unwrap().is_join_code_changed());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(channel.set_lock_calls(), 2);
    assert!(events.try_recv().unwrap().is_join_code_changed());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_manual_refresh_cancels_prior_timer() {
    let (host, channel) = new_host();

    host.connect(refresh_options(10)).await.unwrap();
    host.refresh_join_code(Some(Duration::from_secs(10)))
        .await
        .unwrap();
    assert_eq!(channel.set_lock_calls(), 2);

    // Only the rescheduled timer fires; the original was cancelled
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(channel.set_lock_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_scheduled_rotation() {
    let (host, channel) = new_host();
    let mut events = host.subscribe();

    host.connect(refresh_options(10)).await.unwrap();
    assert!(events.try_recv().unwrap().is_join_code_changed());

    host.disconnect().await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(channel.set_lock_calls(), 1);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_forced_disconnect_cancels_scheduled_rotation() {
    let (host, channel) = new_host();

    host.connect(refresh_options(10)).await.unwrap();
    channel.force_disconnect("stream-error");
    settle().await;

    assert_eq!(host.state().await, ConnectionState::Disconnected);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(channel.set_lock_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_command_is_acknowledged() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();
    let mut events = host.subscribe();

    let ack = channel
        .inject_command("req-1", "p1@conf", "set-volume", r#"{"volume": 5}"#)
        .await
        .unwrap();
    assert_eq!(ack.request_id, "req-1");
    assert_eq!(ack.to, PeerAddress::from("p1@conf"));
    assert!(ack.success);

    assert_eq!(
        events.try_recv().unwrap(),
        RemoteControlEvent::RemoteMessage {
            message_type: "set-volume".to_string(),
            data: json!({"volume": 5}),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_still_acknowledged() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();
    let mut events = host.subscribe();

    let ack = channel
        .inject_command("req-2", "p1@conf", "go-home", "not-json")
        .await
        .unwrap();
    assert_eq!(ack.request_id, "req-2");
    assert_eq!(ack.to, PeerAddress::from("p1@conf"));
    assert!(ack.success);

    assert_eq!(
        events.try_recv().unwrap(),
        RemoteControlEvent::RemoteMessage {
            message_type: "go-home".to_string(),
            data: json!({}),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_peer_leaving_emits_cleanup_signal_without_reply() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();
    let mut events = host.subscribe();

    channel.inject_presence("p2@conf", Availability::Unavailable);
    settle().await;

    match events.try_recv().unwrap() {
        RemoteControlEvent::RemoteMessage { message_type, data } => {
            assert_eq!(message_type, message_types::PEER_LEFT);
            assert_eq!(data["from"], "p2@conf");
            assert!(data["data"].is_object());
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // Local-only signal: nothing goes back over the channel
    assert!(channel.sent_messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_peer_arriving_is_ignored() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();
    let mut events = host.subscribe();

    channel.inject_presence("p2@conf", Availability::Available);
    settle().await;

    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_remote_control_update_is_proxied() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();
    let mut events = host.subscribe();

    channel.inject_application_message(
        message_types::REMOTE_CONTROL_UPDATE,
        "r1@conf",
        json!({"view": "feedback"}),
    );
    channel.inject_application_message("future-kind", "r1@conf", json!({}));
    settle().await;

    assert_eq!(
        events.try_recv().unwrap(),
        RemoteControlEvent::ProxyMessage {
            from: PeerAddress::from("r1@conf"),
            data: json!({"view": "feedback"}),
        }
    );
    // Unknown kinds are dropped silently
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_concurrent_connect_establishes_one_channel() {
    let (host, channel) = new_host();

    let (first, second) = futures::join!(
        host.connect(ConnectOptions::default()),
        host.connect(ConnectOptions::default()),
    );

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(channel.connect_calls(), 1);
}

#[tokio::test]
async fn test_send_while_disconnected_rejects() {
    let (host, _channel) = new_host();

    let result = host
        .send_message_to_remote_control(&PeerAddress::from("r1@conf"), json!({"action": "mute"}))
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Channel(ChannelError::NotConnected))
    ));
}

#[tokio::test]
async fn test_send_message_reaches_channel() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();

    host.send_message_to_remote_control(&PeerAddress::from("r1@conf"), json!({"action": "mute"}))
        .await
        .unwrap();

    let sent = channel.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, PeerAddress::from("r1@conf"));
    assert_eq!(sent[0].kind, message_types::UPDATE_MESSAGE);
    assert_eq!(sent[0].data, json!({"action": "mute"}));
}

#[tokio::test]
async fn test_failed_rotation_keeps_previous_join_code() {
    let (host, channel) = new_host();
    host.connect(ConnectOptions::default()).await.unwrap();
    host.refresh_join_code(None).await.unwrap();
    let before = host.join_code();
    let mut events = host.subscribe();

    channel.fail_set_lock(true);
    let result = host.refresh_join_code(None).await;

    assert!(result.is_err());
    assert_eq!(host.join_code(), before);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let (host, channel) = new_host();

    host.connect(ConnectOptions::default()).await.unwrap();
    host.disconnect().await.unwrap();
    assert_eq!(host.join_code(), "");

    host.connect(ConnectOptions::default()).await.unwrap();
    assert_eq!(host.state().await, ConnectionState::Connected(
        roomlink_core::ChannelHandle { room_id: "meet123".to_string() }
    ));
    assert_eq!(channel.connect_calls(), 2);
}
