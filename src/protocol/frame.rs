//! Outbound frame encoding
//!
//! Encodes a complete server-to-client frame (FIN set, unmasked) in one
//! pass. The three length forms of RFC 6455 §5.2:
//!
//! ```text
//! payload <= 125        [F|RSV|op][len:7]
//! payload <= 65535      [F|RSV|op][126][len:16]
//! payload >  65535      [F|RSV|op][127][len:64]
//! ```
//!
//! Inbound parsing (and client-side masking) is the transport
//! collaborator's job; the group only ever emits shared outbound frames.

use bytes::{BufMut, Bytes, BytesMut};

use super::OpCode;

const FIN: u8 = 0x80;
const RSV1: u8 = 0x40;

/// Encode one complete unmasked frame carrying `payload`.
///
/// `compressed` sets the RSV1 bit for permessage-deflate payloads; the
/// payload must already be deflated by the caller in that case.
pub fn encode_frame(payload: &[u8], opcode: OpCode, compressed: bool) -> Bytes {
    let mut buf = BytesMut::with_capacity(payload.len() + 10);

    let mut first = FIN | (opcode as u8);
    if compressed {
        first |= RSV1;
    }
    buf.put_u8(first);

    if payload.len() <= 125 {
        buf.put_u8(payload.len() as u8);
    } else if payload.len() <= u16::MAX as usize {
        buf.put_u8(126);
        buf.put_u16(payload.len() as u16);
    } else {
        buf.put_u8(127);
        buf.put_u64(payload.len() as u64);
    }

    buf.put_slice(payload);
    buf.freeze()
}

/// Encode a close frame: 2-byte big-endian status code plus reason.
pub fn encode_close_frame(code: u16, reason: &[u8]) -> Bytes {
    let mut body = BytesMut::with_capacity(2 + reason.len());
    body.put_u16(code);
    body.put_slice(reason);
    encode_frame(&body, OpCode::Close, false)
}
