//! Binary frame codec
//!
//! A frame is an 8-byte little-endian header `(op: u32, length: u32)`
//! followed by `length` bytes of UTF-8 JSON. The declared length always
//! equals the encoded payload size.

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::IpcError;

/// Frame operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    /// Opens the session; carries the protocol version and client id
    Handshake = 0,
    /// Regular command/event frame
    Frame = 1,
    /// Connection teardown
    Close = 2,
    Ping = 3,
    Pong = 4,
}

impl TryFrom<u32> for Opcode {
    type Error = IpcError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Handshake),
            1 => Ok(Opcode::Frame),
            2 => Ok(Opcode::Close),
            3 => Ok(Opcode::Ping),
            4 => Ok(Opcode::Pong),
            other => Err(IpcError::Protocol(format!("unknown opcode {other}"))),
        }
    }
}

/// Encode a frame into its wire form.
pub fn encode_frame(op: Opcode, payload: &Value) -> Vec<u8> {
    let body = payload.to_string();
    let mut buf = Vec::with_capacity(8 + body.len());
    buf.extend_from_slice(&(op as u32).to_le_bytes());
    buf.extend_from_slice(&(body.len() as u32).to_le_bytes());
    buf.extend_from_slice(body.as_bytes());
    buf
}

/// Decode one complete frame from `bytes`.
pub fn decode_frame(bytes: &[u8]) -> Result<(Opcode, Value), IpcError> {
    if bytes.len() < 8 {
        return Err(IpcError::Protocol("truncated frame header".into()));
    }
    let op = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let length = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if bytes.len() - 8 != length {
        return Err(IpcError::Protocol(format!(
            "declared length {length} does not match payload size {}",
            bytes.len() - 8
        )));
    }
    let payload = serde_json::from_slice(&bytes[8..])
        .map_err(|err| IpcError::Protocol(format!("invalid frame payload: {err}")))?;
    Ok((Opcode::try_from(op)?, payload))
}

/// Write one frame. Any I/O failure surfaces as connection-lost.
pub async fn write_frame<W>(writer: &mut W, op: Opcode, payload: &Value) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(&encode_frame(op, payload))
        .await
        .map_err(IpcError::lost)
}

/// Read one frame. A short or zero-length read while consuming the header
/// or payload surfaces as connection-lost.
pub async fn read_frame<R>(reader: &mut R) -> Result<(Opcode, Value), IpcError>
where
    R: AsyncRead + Unpin,
{
    let op = reader.read_u32_le().await.map_err(IpcError::lost)?;
    let length = reader.read_u32_le().await.map_err(IpcError::lost)?;
    let mut buf = vec![0u8; length as usize];
    reader.read_exact(&mut buf).await.map_err(IpcError::lost)?;
    let payload = serde_json::from_slice(&buf)
        .map_err(|err| IpcError::Protocol(format!("invalid frame payload: {err}")))?;
    Ok((Opcode::try_from(op)?, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let payload = json!({ "a": 1 });
        let bytes = encode_frame(Opcode::Frame, &payload);
        let (op, decoded) = decode_frame(&bytes).unwrap();
        assert_eq!(op, Opcode::Frame);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_frame(Opcode::Handshake, &json!({}));
        assert_eq!(&bytes[0..4], &0u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..], b"{}");
    }

    #[test]
    fn test_declared_length_matches_payload() {
        let payload = json!({ "cmd": "SET_ACTIVITY", "nonce": "n" });
        let bytes = encode_frame(Opcode::Frame, &payload);
        let declared = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        assert_eq!(declared, bytes.len() - 8);
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let mut bytes = encode_frame(Opcode::Frame, &json!({ "a": 1 }));
        bytes.push(b' ');
        assert!(matches!(
            decode_frame(&bytes),
            Err(IpcError::Protocol(_))
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_header() {
        assert!(matches!(
            decode_frame(&[1, 0, 0]),
            Err(IpcError::Protocol(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_opcode() {
        let mut bytes = encode_frame(Opcode::Frame, &json!({}));
        bytes[0] = 9;
        assert!(matches!(decode_frame(&bytes), Err(IpcError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let payload = json!({ "v": 1, "client_id": "42" });
        let mut buf = Vec::new();
        write_frame(&mut buf, Opcode::Handshake, &payload).await.unwrap();
        let (op, decoded) = read_frame(&mut buf.as_slice()).await.unwrap();
        assert_eq!(op, Opcode::Handshake);
        assert_eq!(decoded, payload);
    }

    #[tokio::test]
    async fn test_eof_mid_payload_is_connection_lost() {
        let bytes = encode_frame(Opcode::Frame, &json!({ "a": 1 }));
        let truncated = &bytes[..bytes.len() - 2];
        assert!(matches!(
            read_frame(&mut &truncated[..]).await,
            Err(IpcError::ConnectionLost(_))
        ));
    }

    #[tokio::test]
    async fn test_eof_mid_header_is_connection_lost() {
        let bytes = [1u8, 0, 0];
        assert!(matches!(
            read_frame(&mut &bytes[..]).await,
            Err(IpcError::ConnectionLost(_))
        ));
    }
}
