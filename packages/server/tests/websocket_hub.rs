//! WebSocket hub integration tests.
//!
//! Connect, chat, disconnect and malformed-message scenarios against an
//! in-process hub.

mod fixtures;

use std::time::Duration;

use fixtures::TestServer;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};
use wschat_shared::{Action, Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn connect(server: &TestServer) -> Client {
    let (ws, _) = connect_async(server.ws_url())
        .await
        .expect("Failed to connect");
    ws
}

/// Next decoded message, or `None` once the hub closed the connection.
async fn next_message(ws: &mut Client) -> Option<Message> {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame");
        match frame {
            Some(Ok(tungstenite::Message::Text(text))) => {
                return Some(Message::decode(text.as_str()).expect("hub sent undecodable message"));
            }
            Some(Ok(tungstenite::Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

async fn expect_message(ws: &mut Client) -> Message {
    next_message(ws).await.expect("connection closed unexpectedly")
}

/// Assert nothing arrives within `window`.
async fn expect_silence(ws: &mut Client, window: Duration) {
    if let Ok(Some(Ok(frame))) = tokio::time::timeout(window, ws.next()).await {
        panic!("expected no message, got {frame:?}");
    }
}

async fn send_text(ws: &mut Client, text: &str) {
    ws.send(tungstenite::Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send");
}

/// Connect and consume the handshake; returns the client and its identity.
async fn join(server: &TestServer, expected_total: usize) -> (Client, String) {
    let mut ws = connect(server).await;
    let hello = expect_message(&mut ws).await;
    assert_eq!(hello.action, Action::Connect);
    let id = hello.contents().to_string();
    server.wait_for_connections(expected_total).await;
    (ws, id)
}

#[tokio::test]
async fn test_connect_announcements() {
    // テスト項目: A の接続で A 自身に connect が届き、B の接続では A と B に B の connect が届く
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作): A が接続
    let mut a = connect(&server).await;
    let a_hello = expect_message(&mut a).await;
    server.wait_for_connections(1).await;

    // then (期待する結果):
    assert_eq!(a_hello.action, Action::Connect);
    assert_eq!(a_hello.sender(), Some("system"));
    assert!(!a_hello.contents().is_empty());
    let a_id = a_hello.contents().to_string();

    // when (操作): B が接続
    let mut b = connect(&server).await;
    let b_hello = expect_message(&mut b).await;
    let a_sees_b = expect_message(&mut a).await;

    // then (期待する結果): B は自分の connect だけを 1 回受け取る
    assert_eq!(b_hello.action, Action::Connect);
    let b_id = b_hello.contents().to_string();
    assert_ne!(a_id, b_id);
    assert_eq!(a_sees_b.action, Action::Connect);
    assert_eq!(a_sees_b.contents(), b_id);
    expect_silence(&mut b, Duration::from_millis(200)).await;
    expect_silence(&mut a, Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_chat_is_rebroadcast_with_true_sender() {
    // テスト項目: A の chat "hello" が A と B の両方に sender=A で届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut a, a_id) = join(&server, 1).await;
    let (mut b, _b_id) = join(&server, 2).await;
    let _ = expect_message(&mut a).await; // B の connect

    // when (操作): sender を偽装して送る
    send_text(&mut a, r#"{"sender":"someone-else","action":"chat","contents":"hello"}"#).await;

    // then (期待する結果):
    for ws in [&mut a, &mut b] {
        let msg = expect_message(ws).await;
        assert_eq!(msg.action, Action::Chat);
        assert_eq!(msg.sender(), Some(a_id.as_str()));
        assert_eq!(msg.contents(), "hello");
    }
}

#[tokio::test]
async fn test_disconnect_is_announced_once() {
    // テスト項目: A が切断すると、残りの全接続に disconnect が 1 回だけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut a, a_id) = join(&server, 1).await;
    let (mut b, _) = join(&server, 2).await;
    let (mut c, _) = join(&server, 3).await;
    let _ = expect_message(&mut b).await; // C の connect

    // when (操作):
    a.close(None).await.expect("Failed to close");

    // then (期待する結果):
    for ws in [&mut b, &mut c] {
        let msg = expect_message(ws).await;
        assert_eq!(msg.action, Action::Disconnect);
        assert_eq!(msg.sender(), Some("system"));
        assert_eq!(msg.contents(), a_id);
    }
    server.wait_for_connections(2).await;
    expect_silence(&mut b, Duration::from_millis(200)).await;
    expect_silence(&mut c, Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_malformed_message_is_rejected_and_connection_closed() {
    // テスト項目: 不正なメッセージには error "bad message" が返り、接続が終了する
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut a, a_id) = join(&server, 1).await;
    let (mut b, _) = join(&server, 2).await;
    let _ = expect_message(&mut a).await; // B の connect

    // when (操作):
    send_text(&mut a, r#"{"action":"shout","contents":"hi"}"#).await;

    // then (期待する結果): A には error が届き、その後に接続が閉じられる
    let rejection = expect_message(&mut a).await;
    assert_eq!(rejection.action, Action::Error);
    assert_eq!(rejection.contents(), "bad message");
    assert!(next_message(&mut a).await.is_none());

    // B には A の disconnect が届き、不正メッセージ自体は配信されない
    let msg = expect_message(&mut b).await;
    assert_eq!(msg.action, Action::Disconnect);
    assert_eq!(msg.contents(), a_id);
    server.wait_for_connections(1).await;
}

#[tokio::test]
async fn test_single_connection_receives_own_chat() {
    // テスト項目: 接続が 1 つだけでも自分の chat が返ってくる
    let server = TestServer::start().await;
    let (mut a, a_id) = join(&server, 1).await;

    send_text(&mut a, &Message::chat("ignored", "echo").encode().unwrap()).await;

    let msg = expect_message(&mut a).await;
    assert_eq!(msg.sender(), Some(a_id.as_str()));
    assert_eq!(msg.contents(), "echo");
}
