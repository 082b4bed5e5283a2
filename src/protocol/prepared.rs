//! Prepared messages for broadcast
//!
//! A broadcast pays the frame-encoding cost exactly once: `prepare`
//! produces a complete wire image in one `Bytes`, every recipient's
//! `send_prepared` borrows the same image, and `finalize` retires it
//! after the traversal. `Bytes` reference counting means a transport
//! that queues the frame keeps the allocation alive without copying.
//!
//! `finalize` takes the message by value, so a prepared message cannot
//! be finalized twice or sent after finalization.

use bytes::Bytes;

use super::frame::encode_frame;
use super::OpCode;

/// A pre-encoded frame shared by every recipient of one broadcast
#[derive(Debug)]
pub struct PreparedMessage {
    frame: Bytes,
    opcode: OpCode,
}

impl PreparedMessage {
    /// The complete wire image, header included
    pub fn frame(&self) -> &Bytes {
        &self.frame
    }

    /// Opcode the message was prepared with
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    /// Payload length carried by the frame
    pub fn payload_len(&self) -> usize {
        match self.frame.get(1).copied().unwrap_or(0) {
            126 => u16::from_be_bytes([self.frame[2], self.frame[3]]) as usize,
            127 => u64::from_be_bytes([
                self.frame[2],
                self.frame[3],
                self.frame[4],
                self.frame[5],
                self.frame[6],
                self.frame[7],
                self.frame[8],
                self.frame[9],
            ]) as usize,
            n => n as usize,
        }
    }
}

/// Encode `payload` into a shareable frame, once per broadcast.
pub fn prepare(payload: &[u8], opcode: OpCode, compressed: bool) -> PreparedMessage {
    PreparedMessage {
        frame: encode_frame(payload, opcode, compressed),
        opcode,
    }
}

/// Retire a prepared message after its broadcast completes.
///
/// Transports that queued the frame keep their `Bytes` clones; this
/// releases the broadcast's own reference.
pub fn finalize(msg: PreparedMessage) {
    tracing::trace!(
        opcode = ?msg.opcode,
        frame_len = msg.frame.len(),
        "Prepared message finalized"
    );
    drop(msg);
}
