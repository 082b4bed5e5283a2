//! Connection collaborator contract
//!
//! The group never performs I/O itself: each member is an opaque handle
//! supplied by the accept/connect collaborator, and the group drives it
//! through this trait. The framing and socket plumbing behind the
//! handle are out of scope here.

use std::any::Any;

use crate::protocol::PreparedMessage;

/// One live connection owned by the transport layer
///
/// Implementations are expected to be non-blocking: `send_prepared`
/// queues the shared frame, `terminate` drops the socket without a
/// close handshake, `close` queues a graceful close frame. A member
/// whose transport has already died may ignore all three.
pub trait Connection {
    /// Queue a shared pre-encoded frame for sending
    fn send_prepared(&mut self, msg: &PreparedMessage);

    /// Hard-close the connection, skipping the close handshake
    fn terminate(&mut self);

    /// Send a graceful close frame with `code` and `reason`, then close
    fn close(&mut self, code: u16, reason: &[u8]);

    /// Per-connection data associated by the embedder
    fn user_data(&self) -> Option<&dyn Any> {
        None
    }
}
