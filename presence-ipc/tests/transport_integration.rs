//! Integration tests against an in-process fake presence client.
//!
//! Each test binds a unix socket in the system temp directory, scripts the
//! server side with the public frame codec, and drives the real transport
//! against it.

use std::path::PathBuf;

use serde_json::{json, Value};
use tokio::net::{UnixListener, UnixStream};
use uuid::Uuid;

use presence_ipc::{read_frame, write_frame, IpcError, Opcode, Transport};

const CLIENT_ID: &str = "435587535150907392";

fn socket_path() -> PathBuf {
    std::env::temp_dir().join(format!("presence-ipc-test-{}", Uuid::new_v4()))
}

fn ready_reply() -> Value {
    json!({
        "cmd": "DISPATCH",
        "evt": "READY",
        "data": { "v": 1 },
        "nonce": null,
    })
}

async fn accept(listener: &UnixListener) -> UnixStream {
    listener.accept().await.expect("accept").0
}

/// Read the handshake frame and answer READY.
async fn serve_handshake(stream: &mut UnixStream) {
    let (op, payload) = read_frame(stream).await.expect("handshake frame");
    assert_eq!(op, Opcode::Handshake);
    assert_eq!(payload["v"], 1);
    assert_eq!(payload["client_id"], CLIENT_ID);
    write_frame(stream, Opcode::Frame, &ready_reply())
        .await
        .expect("ready reply");
}

#[tokio::test]
async fn handshake_completes_against_ready_server() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept(&listener).await;
        serve_handshake(&mut stream).await;
        stream
    });

    let transport = Transport::connect_path(&path, CLIENT_ID).await;
    assert!(transport.is_ok(), "{:?}", transport.err());

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn transient_handshake_reply_is_retried() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept(&listener).await;
        // first attempt: the not-ready sentinel
        let (op, _) = read_frame(&mut stream).await.unwrap();
        assert_eq!(op, Opcode::Handshake);
        let sentinel = json!({ "message": "Cannot read property 'id' of undefined" });
        write_frame(&mut stream, Opcode::Frame, &sentinel).await.unwrap();
        // second attempt succeeds
        serve_handshake(&mut stream).await;
        stream
    });

    let transport = Transport::connect_path(&path, CLIENT_ID).await;
    assert!(transport.is_ok(), "{:?}", transport.err());

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn unexpected_handshake_reply_is_fatal() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept(&listener).await;
        let _ = read_frame(&mut stream).await.unwrap();
        let reply = json!({ "evt": "ERROR", "data": { "message": "bad client id" } });
        write_frame(&mut stream, Opcode::Frame, &reply).await.unwrap();
        stream
    });

    let result = Transport::connect_path(&path, CLIENT_ID).await;
    assert!(matches!(result, Err(IpcError::HandshakeRejected(_))));

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn eof_during_handshake_is_connection_lost() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let stream = accept(&listener).await;
        // hang up without answering
        drop(stream);
    });

    let result = Transport::connect_path(&path, CLIENT_ID).await;
    assert!(matches!(result, Err(IpcError::ConnectionLost(_))));

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn send_recv_discards_mismatched_nonces() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept(&listener).await;
        serve_handshake(&mut stream).await;

        let (op, request) = read_frame(&mut stream).await.unwrap();
        assert_eq!(op, Opcode::Frame);
        let nonce = request["nonce"].as_str().expect("nonce attached").to_owned();

        // a stray frame for some other request first
        let stray = json!({ "cmd": "DISPATCH", "nonce": "someone-else" });
        write_frame(&mut stream, Opcode::Frame, &stray).await.unwrap();

        let reply = json!({ "cmd": request["cmd"], "evt": null, "nonce": nonce });
        write_frame(&mut stream, Opcode::Frame, &reply).await.unwrap();
        stream
    });

    let mut transport = Transport::connect_path(&path, CLIENT_ID).await.unwrap();
    let (op, reply) = transport
        .send_recv(json!({ "cmd": "SET_ACTIVITY" }))
        .await
        .unwrap();
    assert_eq!(op, Opcode::Frame);
    assert_eq!(reply["cmd"], "SET_ACTIVITY");
    assert_ne!(reply["nonce"], "someone-else");

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn set_activity_builds_the_documented_request() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept(&listener).await;
        serve_handshake(&mut stream).await;

        // set with an activity attached
        let (_, request) = read_frame(&mut stream).await.unwrap();
        assert_eq!(request["cmd"], "SET_ACTIVITY");
        assert_eq!(request["args"]["pid"], 4242);
        assert_eq!(request["args"]["activity"]["details"], "Song");
        assert!(request["nonce"].is_string());
        let reply = json!({ "cmd": "SET_ACTIVITY", "nonce": request["nonce"] });
        write_frame(&mut stream, Opcode::Frame, &reply).await.unwrap();

        // clear: the activity key must be absent, not null
        let (_, request) = read_frame(&mut stream).await.unwrap();
        assert_eq!(request["cmd"], "SET_ACTIVITY");
        assert!(request["args"].get("activity").is_none());
        let reply = json!({ "cmd": "SET_ACTIVITY", "nonce": request["nonce"] });
        write_frame(&mut stream, Opcode::Frame, &reply).await.unwrap();
        stream
    });

    let mut transport = Transport::connect_path(&path, CLIENT_ID).await.unwrap();
    let reply = transport
        .set_activity(4242, Some(json!({ "details": "Song" })))
        .await
        .unwrap();
    assert_eq!(reply["cmd"], "SET_ACTIVITY");
    transport.set_activity(4242, None).await.unwrap();

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn connection_loss_mid_request_unwinds_send_recv() {
    let path = socket_path();
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let mut stream = accept(&listener).await;
        serve_handshake(&mut stream).await;
        // read the request, then hang up before replying
        let _ = read_frame(&mut stream).await.unwrap();
        drop(stream);
    });

    let mut transport = Transport::connect_path(&path, CLIENT_ID).await.unwrap();
    let result = transport.send_recv(json!({ "cmd": "SET_ACTIVITY" })).await;
    assert!(matches!(result, Err(IpcError::ConnectionLost(_))));

    server.await.unwrap();
    let _ = std::fs::remove_file(&path);
}
