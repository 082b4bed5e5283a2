//! Event handler slots
//!
//! One slot per event kind, single-subscriber: registering a handler
//! overwrites whatever was there. An empty slot is the no-op default,
//! so a group is safely callable before any configuration.
//!
//! Handlers receive `&mut Group` and may synchronously mutate
//! membership, broadcast, or re-register handlers; the registry's
//! cursor stack makes that safe during traversal.

use std::collections::VecDeque;

use crate::connection::Connection;
use crate::error::GroupError;
use crate::protocol::OpCode;
use crate::registry::ConnId;

use super::Group;

/// Request metadata captured at upgrade time, passed to the
/// connection-established handler
#[derive(Debug, Clone, Default)]
pub struct UpgradeInfo {
    /// Request path of the upgrade
    pub path: String,
    /// Host header of the upgrade
    pub host: String,
}

/// Connection-established handler
pub type ConnectionHandler<C> = Box<dyn FnMut(&mut Group<C>, ConnId, &UpgradeInfo)>;
/// Message-received handler
pub type MessageHandler<C> = Box<dyn FnMut(&mut Group<C>, ConnId, &[u8], OpCode)>;
/// Disconnected handler: close code plus close reason
pub type DisconnectionHandler<C> = Box<dyn FnMut(&mut Group<C>, ConnId, u16, &[u8])>;
/// Ping- or pong-received handler
pub type ControlHandler<C> = Box<dyn FnMut(&mut Group<C>, ConnId, &[u8])>;
/// Error handler, fed by collaborators
pub type ErrorHandler<C> = Box<dyn FnMut(&mut Group<C>, GroupError)>;

/// An event whose slot was busy when it fired, held with owned
/// payloads until the in-flight handler of the same kind returns
pub(super) enum PendingEvent {
    Connection(ConnId, UpgradeInfo),
    Message(ConnId, Vec<u8>, OpCode),
    Disconnection(ConnId, u16, Vec<u8>),
    Ping(ConnId, Vec<u8>),
    Pong(ConnId, Vec<u8>),
    Error(GroupError),
}

/// The group's handler set; `None` slots are no-ops
pub struct Handlers<C: Connection> {
    pub(super) connection: Option<ConnectionHandler<C>>,
    pub(super) message: Option<MessageHandler<C>>,
    pub(super) disconnection: Option<DisconnectionHandler<C>>,
    pub(super) ping: Option<ControlHandler<C>>,
    pub(super) pong: Option<ControlHandler<C>>,
    pub(super) error: Option<ErrorHandler<C>>,
    pub(super) pending: VecDeque<PendingEvent>,
    pub(super) depth: usize,
}

impl<C: Connection> Default for Handlers<C> {
    fn default() -> Self {
        Self {
            connection: None,
            message: None,
            disconnection: None,
            ping: None,
            pong: None,
            error: None,
            pending: VecDeque::new(),
            depth: 0,
        }
    }
}

impl<C: Connection> std::fmt::Debug for Handlers<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("connection", &self.connection.is_some())
            .field("message", &self.message.is_some())
            .field("disconnection", &self.disconnection.is_some())
            .field("ping", &self.ping.is_some())
            .field("pong", &self.pong.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Take a handler slot, run it, and restore it afterwards unless the
/// handler replaced itself meanwhile (last registration wins).
///
/// The `defer` form covers reentrancy on the same event kind: the slot
/// is empty while its handler runs, so a nested event of that kind (a
/// disconnection handler terminating another member, say) is parked and
/// replayed in order once the outermost handler returns.
macro_rules! dispatch {
    ($group:expr, $slot:ident, defer $queued:expr, |$h:ident| $call:expr) => {
        if $group.handlers.$slot.is_some() || $group.handlers.depth == 0 {
            dispatch!($group, $slot, |$h| $call);
        } else {
            $group.handlers.pending.push_back($queued);
        }
    };
    ($group:expr, $slot:ident, |$h:ident| $call:expr) => {
        if let Some(mut $h) = $group.handlers.$slot.take() {
            $group.handlers.depth += 1;
            $call;
            $group.handlers.depth -= 1;
            if $group.handlers.$slot.is_none() {
                $group.handlers.$slot = Some($h);
            }
            if $group.handlers.depth == 0 {
                $group.replay_pending();
            }
        }
    };
}

pub(super) use dispatch;
