//! Unix-socket transport for the rich-presence channel
//!
//! The presence client listens on a local socket and speaks binary-framed
//! JSON: an 8-byte little-endian `(op, length)` header followed by the
//! payload. This crate owns everything below the sync loop: socket
//! discovery, the handshake (including its transient-failure retry),
//! nonce-correlated request/reply, and teardown.
//!
//! The transport is strictly half-duplex — one nonce-correlated request in
//! flight at a time — which is all the sync loop ever needs.

mod error;
mod frame;
mod transport;

pub use error::IpcError;
pub use frame::{decode_frame, encode_frame, read_frame, write_frame, Opcode};
pub use transport::Transport;
