//! Group error types
//!
//! The group core itself raises no errors: failures originate in
//! collaborators (a failed send, a dropped connect attempt, a dead
//! listener) and are reported through the group's single error-handler
//! slot.

use crate::registry::ConnId;

/// Convenience result alias for collaborator code feeding a group.
pub type Result<T> = std::result::Result<T, GroupError>;

/// Error surfaced to a group's error handler by its collaborators
#[derive(Debug)]
pub enum GroupError {
    /// A client connect attempt failed before the connection joined the group
    Connect(std::io::Error),
    /// Sending to a member failed; the member is identified by its id
    Send(ConnId, std::io::Error),
    /// The listening socket failed
    Listen(std::io::Error),
}

impl std::fmt::Display for GroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupError::Connect(e) => write!(f, "Connect failed: {}", e),
            GroupError::Send(id, e) => write!(f, "Send to {} failed: {}", id, e),
            GroupError::Listen(e) => write!(f, "Listener failed: {}", e),
        }
    }
}

impl std::error::Error for GroupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GroupError::Connect(e) | GroupError::Send(_, e) | GroupError::Listen(e) => Some(e),
        }
    }
}
