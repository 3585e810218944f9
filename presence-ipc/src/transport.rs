//! Presence socket transport: connection, handshake and request/reply
//! correlation.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::UnixStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::IpcError;
use crate::frame::{read_frame, write_frame, Opcode};

/// Environment variables consulted for the runtime directory, in order.
const RUNTIME_DIR_VARS: [&str; 4] = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"];

/// Sub-directories where sandboxed clients expose their socket.
const RUNTIME_SUBDIRS: [&str; 3] = ["snap.discord", "app/com.discordapp.Discord", ""];

/// Fixed delay between retries of the transient handshake failure.
const HANDSHAKE_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Cap on transient-handshake retries before the failure becomes fatal.
const HANDSHAKE_RETRY_LIMIT: u32 = 10;

/// Reply the client sends while its internal state is not ready yet.
const HANDSHAKE_TRANSIENT_MESSAGE: &str = "Cannot read property 'id' of undefined";

/// Connection to the local presence client.
///
/// Strictly half-duplex request/reply: at most one nonce-correlated request
/// is in flight at a time, so the whole transport is owned by a single
/// task and needs no locking.
#[derive(Debug)]
pub struct Transport {
    stream: UnixStream,
}

impl Transport {
    /// Connect to the first reachable presence socket and perform the
    /// handshake.
    pub async fn connect(client_id: &str) -> Result<Self, IpcError> {
        let stream = open_first_socket().await?;
        let mut transport = Self { stream };
        transport.handshake(client_id).await?;
        Ok(transport)
    }

    /// Connect to a specific socket path. Used by tests and non-standard
    /// client setups.
    pub async fn connect_path(path: &Path, client_id: &str) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path)
            .await
            .map_err(|err| IpcError::SocketNotFound(format!("{}: {err}", path.display())))?;
        let mut transport = Self { stream };
        transport.handshake(client_id).await?;
        Ok(transport)
    }

    /// Send the handshake frame and wait for the dispatch/ready reply.
    ///
    /// The client occasionally answers with a transient error payload
    /// before it is ready; that reply is retried after a fixed delay, a
    /// bounded number of times. Every other unexpected reply is fatal.
    async fn handshake(&mut self, client_id: &str) -> Result<(), IpcError> {
        let payload = json!({ "v": 1, "client_id": client_id });
        let transient = json!({ "message": HANDSHAKE_TRANSIENT_MESSAGE });
        let mut attempts = 0u32;
        loop {
            self.send(Opcode::Handshake, &payload).await?;
            let (op, reply) = self.recv().await?;
            if op == Opcode::Frame
                && reply.get("cmd").and_then(Value::as_str) == Some("DISPATCH")
                && reply.get("evt").and_then(Value::as_str) == Some("READY")
            {
                return Ok(());
            }
            if reply == transient {
                attempts += 1;
                if attempts >= HANDSHAKE_RETRY_LIMIT {
                    return Err(IpcError::HandshakeRejected(format!(
                        "client still not ready after {attempts} attempts"
                    )));
                }
                debug!(attempts, "client not ready yet, retrying handshake");
                tokio::time::sleep(HANDSHAKE_RETRY_DELAY).await;
                continue;
            }
            if op == Opcode::Close {
                let _ = self.send(Opcode::Close, &json!({})).await;
            }
            return Err(IpcError::HandshakeRejected(reply.to_string()));
        }
    }

    /// Send a FRAME request and wait for the correlated reply.
    ///
    /// A nonce is attached when the payload lacks one. Frames carrying a
    /// different nonce are logged and discarded.
    pub async fn send_recv(&mut self, mut payload: Value) -> Result<(Opcode, Value), IpcError> {
        if payload.get("nonce").map_or(true, Value::is_null) {
            payload["nonce"] = Value::String(Uuid::new_v4().to_string());
        }
        let nonce = payload["nonce"].clone();
        self.send(Opcode::Frame, &payload).await?;
        loop {
            let (op, reply) = self.recv().await?;
            if reply.get("nonce") == Some(&nonce) {
                return Ok((op, reply));
            }
            warn!(reply = %reply, "discarding reply with unexpected nonce");
        }
    }

    /// Raw frame write.
    pub async fn send(&mut self, op: Opcode, payload: &Value) -> Result<(), IpcError> {
        debug!(?op, payload = %payload, "sending frame");
        write_frame(&mut self.stream, op, payload).await
    }

    /// Raw frame read.
    pub async fn recv(&mut self) -> Result<(Opcode, Value), IpcError> {
        let (op, payload) = read_frame(&mut self.stream).await?;
        debug!(?op, payload = %payload, "received frame");
        Ok((op, payload))
    }

    /// Update or clear the rich-presence activity.
    ///
    /// `activity: None` clears whatever the client currently displays. The
    /// reply is returned as-is; an `evt == "ERROR"` reply is the caller's
    /// to report.
    pub async fn set_activity(
        &mut self,
        pid: u32,
        activity: Option<Value>,
    ) -> Result<Value, IpcError> {
        let mut args = json!({ "pid": pid });
        if let Some(activity) = activity {
            args["activity"] = activity;
        }
        let (_op, reply) = self
            .send_recv(json!({ "cmd": "SET_ACTIVITY", "args": args }))
            .await?;
        Ok(reply)
    }

    /// Best-effort close: try to deliver a CLOSE frame, then tear the
    /// connection down regardless of the outcome.
    pub async fn close(mut self) {
        use tokio::io::AsyncWriteExt;
        let _ = self.send(Opcode::Close, &json!({})).await;
        let _ = self.stream.shutdown().await;
    }
}

/// First existing runtime directory among the environment candidates,
/// defaulting to `/tmp`.
fn runtime_dir() -> PathBuf {
    for var in RUNTIME_DIR_VARS {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() && Path::new(&value).is_dir() {
                return PathBuf::from(value);
            }
        }
    }
    PathBuf::from("/tmp")
}

/// Candidate socket paths in probe order.
fn socket_candidates() -> Vec<PathBuf> {
    let base = runtime_dir();
    let mut paths = Vec::new();
    for sub in RUNTIME_SUBDIRS {
        let dir = if sub.is_empty() { base.clone() } else { base.join(sub) };
        if !dir.is_dir() {
            continue;
        }
        for i in 0..10 {
            paths.push(dir.join(format!("discord-ipc-{i}")));
        }
    }
    paths
}

async fn open_first_socket() -> Result<UnixStream, IpcError> {
    for path in socket_candidates() {
        if !path.exists() {
            continue;
        }
        debug!(path = %path.display(), "attempting presence socket");
        match UnixStream::connect(&path).await {
            Ok(stream) => return Ok(stream),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to open socket"),
        }
    }
    Err(IpcError::SocketNotFound(
        "no discord-ipc socket in any runtime directory".into(),
    ))
}
