//! WebSocket protocol surface used by the group core
//!
//! Only the pieces the group itself touches live here: the frame
//! opcodes, the extension-option bitmask, close codes, and the
//! prepare-once frame encoder. Handshaking and inbound frame parsing
//! belong to the transport collaborator, not to this crate.

pub mod frame;
pub mod prepared;

pub use frame::{encode_close_frame, encode_frame};
pub use prepared::{finalize, prepare, PreparedMessage};

/// WebSocket frame opcode (RFC 6455 §5.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Continuation of a fragmented message
    Continuation = 0,
    /// UTF-8 text frame
    Text = 1,
    /// Binary frame
    Binary = 2,
    /// Connection close
    Close = 8,
    /// Ping control frame
    Ping = 9,
    /// Pong control frame
    Pong = 10,
}

impl OpCode {
    /// Whether this opcode is a control frame (close/ping/pong)
    pub fn is_control(self) -> bool {
        (self as u8) >= 8
    }
}

/// No extension options requested
pub const NO_OPTIONS: u32 = 0;
/// Negotiate permessage-deflate compression
pub const PERMESSAGE_DEFLATE: u32 = 1;
/// Server resets its compression window between messages
pub const SERVER_NO_CONTEXT_TAKEOVER: u32 = 2;
/// Client resets its compression window between messages
pub const CLIENT_NO_CONTEXT_TAKEOVER: u32 = 4;
/// Disable Nagle's algorithm on member sockets
pub const NO_DELAY: u32 = 8;
/// Allow a sliding deflate window across messages
pub const SLIDING_DEFLATE_WINDOW: u32 = 16;

/// Close code for normal closure
pub const CLOSE_NORMAL: u16 = 1000;
/// Close code for a server going down
pub const CLOSE_GOING_AWAY: u16 = 1001;
/// Close code reported for abnormal termination (no close frame)
pub const CLOSE_ABNORMAL: u16 = 1006;
