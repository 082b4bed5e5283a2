//! The connection group
//!
//! A `Group` is the aggregate the rest of the crate serves: the set of
//! live connections sharing one configuration, one handler table, and
//! group-wide operations (broadcast, keep-alive, teardown). All
//! operations on a group run on the single thread driving its event
//! loop; handlers invoked during a traversal may synchronously mutate
//! membership, which the registry's cursor stack absorbs.
//!
//! External collaborators feed events in through the `handle_*` entry
//! points; the group fans them out to the registered handler slots.

pub mod config;
pub mod handlers;
pub mod keepalive;
pub mod lifecycle;

pub use config::{GroupConfig, LoopContext, Role};
pub use handlers::UpgradeInfo;

use std::any::Any;

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::GroupError;
use crate::eventloop::{ListenState, TimerResource, WakeupResource};
use crate::protocol::{finalize, prepare, OpCode};
use crate::registry::{ConnId, ConnectionRegistry};

use handlers::{dispatch, Handlers, PendingEvent};

/// A group of live connections sharing handlers and configuration
pub struct Group<C: Connection> {
    pub(crate) registry: ConnectionRegistry<C>,
    role: Role,
    extension_options: u32,
    loop_ctx: LoopContext,
    user_data: Option<Box<dyn Any>>,
    pub(crate) handlers: Handlers<C>,
    pub(crate) ping_payload: Option<Bytes>,
    ping_interval: std::time::Duration,
    pub(crate) timer: Option<Box<dyn TimerResource>>,
    pub(crate) wakeup: Option<Box<dyn WakeupResource>>,
    pub(crate) listen: Option<Box<dyn ListenState>>,
}

impl<C: Connection> Group<C> {
    /// Create a group for `role` with a snapshot of the owning loop's
    /// context. Handlers start as no-ops.
    pub fn new(role: Role, config: GroupConfig, loop_ctx: LoopContext) -> Self {
        let extension_options = config.effective_options();
        tracing::debug!(
            ?role,
            extension_options,
            loop_id = loop_ctx.loop_id,
            "Group created"
        );
        Self {
            registry: ConnectionRegistry::new(),
            role,
            extension_options,
            loop_ctx,
            user_data: None,
            handlers: Handlers::default(),
            ping_payload: config.ping_payload,
            ping_interval: config.ping_interval,
            timer: None,
            wakeup: None,
            listen: None,
        }
    }

    /// The group's role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Extension options as applied (no-context-takeover bits forced)
    pub fn extension_options(&self) -> u32 {
        self.extension_options
    }

    /// The loop-context snapshot taken at construction
    pub fn loop_context(&self) -> &LoopContext {
        &self.loop_ctx
    }

    /// Attach opaque user data to the group
    pub fn set_user_data(&mut self, data: Box<dyn Any>) {
        self.user_data = Some(data);
    }

    /// Borrow the group's user data
    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Whether `id` is a current member
    pub fn contains(&self, id: ConnId) -> bool {
        self.registry.contains(id)
    }

    /// Borrow a member's connection handle
    pub fn connection(&self, id: ConnId) -> Option<&C> {
        self.registry.get(id)
    }

    /// Mutably borrow a member's connection handle
    pub fn connection_mut(&mut self, id: ConnId) -> Option<&mut C> {
        self.registry.get_mut(id)
    }

    /// Add a connection to the group without firing the
    /// connection-established handler (socket transfer between groups).
    pub fn add(&mut self, conn: C) -> ConnId {
        self.registry.insert(conn)
    }

    /// Remove a member without firing any handler. Precondition: `id`
    /// must be a current member.
    pub fn remove(&mut self, id: ConnId) -> Option<C> {
        self.registry.remove(id)
    }

    /// Visit every member once. The callback gets the group back and
    /// may mutate membership or start nested traversals.
    pub fn for_each(&mut self, mut visit: impl FnMut(&mut Self, ConnId)) {
        self.registry.push_cursor();
        while let Some(id) = self.registry.cursor() {
            visit(self, id);
            self.registry.advance_cursor_past(id);
        }
        self.registry.pop_cursor();
    }

    /// Send one message to every member.
    ///
    /// The frame is encoded exactly once and shared by every member's
    /// send path, then finalized once traversal completes, members or
    /// not.
    pub fn broadcast(&mut self, payload: &[u8], opcode: OpCode) {
        let msg = prepare(payload, opcode, false);
        tracing::trace!(
            ?opcode,
            payload_len = payload.len(),
            members = self.len(),
            "Broadcast"
        );
        self.for_each(|group, id| {
            if let Some(conn) = group.registry.get_mut(id) {
                conn.send_prepared(&msg);
            }
        });
        finalize(msg);
    }

    // --- collaborator entry points -------------------------------------

    /// A connection completed its upgrade: join the group and fire the
    /// connection-established handler.
    pub fn handle_connection(&mut self, conn: C, info: &UpgradeInfo) -> ConnId {
        let id = self.add(conn);
        dispatch!(
            self,
            connection,
            defer PendingEvent::Connection(id, info.clone()),
            |h| h(self, id, info)
        );
        id
    }

    /// A complete message arrived for `id`.
    pub fn handle_message(&mut self, id: ConnId, data: &[u8], opcode: OpCode) {
        dispatch!(
            self,
            message,
            defer PendingEvent::Message(id, data.to_vec(), opcode),
            |h| h(self, id, data, opcode)
        );
    }

    /// `id` disconnected: leave the group, then fire the handler with
    /// the close code and reason the peer supplied.
    pub fn handle_disconnection(&mut self, id: ConnId, code: u16, reason: &[u8]) {
        self.registry.remove(id);
        dispatch!(
            self,
            disconnection,
            defer PendingEvent::Disconnection(id, code, reason.to_vec()),
            |h| h(self, id, code, reason)
        );
    }

    /// A ping frame arrived for `id`.
    pub fn handle_ping(&mut self, id: ConnId, payload: &[u8]) {
        dispatch!(
            self,
            ping,
            defer PendingEvent::Ping(id, payload.to_vec()),
            |h| h(self, id, payload)
        );
    }

    /// A pong frame arrived for `id`: the member answered the probe, so
    /// its outstanding-probe flag clears before the handler runs.
    pub fn handle_pong(&mut self, id: ConnId, payload: &[u8]) {
        self.acknowledge_pong(id);
        dispatch!(
            self,
            pong,
            defer PendingEvent::Pong(id, payload.to_vec()),
            |h| h(self, id, payload)
        );
    }

    /// A collaborator reports a failure.
    pub fn handle_error(&mut self, error: GroupError) {
        tracing::debug!(%error, "Collaborator reported error");
        dispatch!(self, error, defer PendingEvent::Error(error), |h| h(self, error));
    }

    /// Re-deliver events parked while a handler of their own kind was
    /// running. Runs with the handler table fully restored.
    fn replay_pending(&mut self) {
        while let Some(event) = self.handlers.pending.pop_front() {
            match event {
                PendingEvent::Connection(id, info) => {
                    dispatch!(self, connection, |h| h(self, id, &info));
                }
                PendingEvent::Message(id, data, opcode) => {
                    dispatch!(self, message, |h| h(self, id, &data, opcode));
                }
                PendingEvent::Disconnection(id, code, reason) => {
                    dispatch!(self, disconnection, |h| h(self, id, code, &reason));
                }
                PendingEvent::Ping(id, payload) => {
                    dispatch!(self, ping, |h| h(self, id, &payload));
                }
                PendingEvent::Pong(id, payload) => {
                    dispatch!(self, pong, |h| h(self, id, &payload));
                }
                PendingEvent::Error(error) => {
                    dispatch!(self, error, |h| h(self, error));
                }
            }
        }
    }

    // --- handler registration (last registration wins) -----------------

    /// Set the connection-established handler
    pub fn on_connection(
        &mut self,
        handler: impl FnMut(&mut Group<C>, ConnId, &UpgradeInfo) + 'static,
    ) {
        self.handlers.connection = Some(Box::new(handler));
    }

    /// Set the message-received handler
    pub fn on_message(
        &mut self,
        handler: impl FnMut(&mut Group<C>, ConnId, &[u8], OpCode) + 'static,
    ) {
        self.handlers.message = Some(Box::new(handler));
    }

    /// Set the disconnected handler
    pub fn on_disconnection(
        &mut self,
        handler: impl FnMut(&mut Group<C>, ConnId, u16, &[u8]) + 'static,
    ) {
        self.handlers.disconnection = Some(Box::new(handler));
    }

    /// Set the ping-received handler
    pub fn on_ping(&mut self, handler: impl FnMut(&mut Group<C>, ConnId, &[u8]) + 'static) {
        self.handlers.ping = Some(Box::new(handler));
    }

    /// Set the pong-received handler
    pub fn on_pong(&mut self, handler: impl FnMut(&mut Group<C>, ConnId, &[u8]) + 'static) {
        self.handlers.pong = Some(Box::new(handler));
    }

    /// Set the error handler
    pub fn on_error(&mut self, handler: impl FnMut(&mut Group<C>, GroupError) + 'static) {
        self.handlers.error = Some(Box::new(handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CLIENT_NO_CONTEXT_TAKEOVER, SERVER_NO_CONTEXT_TAKEOVER};
    use crate::testutil::{EventLog, TestConn};

    fn group() -> Group<TestConn> {
        Group::new(Role::Server, GroupConfig::default(), LoopContext::default())
    }

    #[test]
    fn test_takeover_bits_forced_at_construction() {
        let g = group();
        let forced = SERVER_NO_CONTEXT_TAKEOVER | CLIENT_NO_CONTEXT_TAKEOVER;
        assert_eq!(g.extension_options() & forced, forced);
    }

    #[test]
    fn test_user_data_round_trip() {
        let mut g = group();
        assert!(g.user_data().is_none());

        g.set_user_data(Box::new(42u32));
        let data = g.user_data().and_then(|d| d.downcast_ref::<u32>());
        assert_eq!(data, Some(&42));
    }

    #[test]
    fn test_broadcast_shares_identical_frames() {
        let log = EventLog::new();
        let mut g = group();
        let (conn_a, frames_a) = TestConn::new("a", &log);
        let (conn_b, frames_b) = TestConn::new("b", &log);
        g.add(conn_a);
        g.add(conn_b);

        g.broadcast(b"hello", OpCode::Text);

        let a = frames_a.borrow();
        let b = frames_b.borrow();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0], b[0]);
        assert_eq!(&a[0][..], &[0x81, 0x05, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_broadcast_with_no_members() {
        let log = EventLog::new();
        let mut g = group();
        // Must prepare and finalize cleanly with nobody to send to
        g.broadcast(b"anyone?", OpCode::Text);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_handle_connection_fires_handler() {
        let log = EventLog::new();
        let mut g = group();
        let seen = log.clone();
        g.on_connection(move |group, id, info| {
            seen.push(format!("open:{}:{}", info.path, group.contains(id)));
        });

        let (conn, _) = TestConn::new("a", &log);
        g.handle_connection(
            conn,
            &UpgradeInfo {
                path: "/chat".into(),
                host: "example.com".into(),
            },
        );
        assert_eq!(log.entries(), vec!["open:/chat:true"]);
    }

    #[test]
    fn test_handle_disconnection_removes_before_handler() {
        let log = EventLog::new();
        let mut g = group();
        let (conn, _) = TestConn::new("a", &log);
        let id = g.add(conn);

        let seen = log.clone();
        g.on_disconnection(move |group, gone, code, _| {
            seen.push(format!("gone:{}:{}", code, group.contains(gone)));
        });

        g.handle_disconnection(id, 1001, b"away");
        assert_eq!(log.entries(), vec!["gone:1001:false"]);
        assert!(g.is_empty());
    }

    #[test]
    fn test_handlers_default_to_noop() {
        let log = EventLog::new();
        let mut g = group();
        let (conn, _) = TestConn::new("a", &log);
        let id = g.handle_connection(conn, &UpgradeInfo::default());

        // No handler registered anywhere: all entry points are safe
        g.handle_message(id, b"m", OpCode::Text);
        g.handle_ping(id, b"");
        g.handle_pong(id, b"");
        g.handle_disconnection(id, 1000, b"");
    }

    #[test]
    fn test_last_registration_wins() {
        let log = EventLog::new();
        let mut g = group();
        let (conn, _) = TestConn::new("a", &log);
        let id = g.add(conn);

        let first = log.clone();
        g.on_message(move |_, _, _, _| first.push("first"));
        let second = log.clone();
        g.on_message(move |_, _, _, _| second.push("second"));

        g.handle_message(id, b"x", OpCode::Text);
        assert_eq!(log.entries(), vec!["second"]);
    }

    #[test]
    fn test_handler_replacing_itself_keeps_replacement() {
        let log = EventLog::new();
        let mut g = group();
        let (conn, _) = TestConn::new("a", &log);
        let id = g.add(conn);

        let outer = log.clone();
        g.on_message(move |group, _, _, _| {
            outer.push("original");
            let inner = outer.clone();
            group.on_message(move |_, _, _, _| inner.push("replacement"));
        });

        g.handle_message(id, b"x", OpCode::Text);
        g.handle_message(id, b"y", OpCode::Text);
        assert_eq!(log.entries(), vec!["original", "replacement"]);
    }

    #[test]
    fn test_nested_same_event_replays_after_outer_handler() {
        let log = EventLog::new();
        let mut g = group();
        let (conn, _) = TestConn::new("a", &log);
        let id = g.add(conn);

        let seen = log.clone();
        g.on_message(move |group, id, data, _| {
            seen.push(format!("msg:{}", String::from_utf8_lossy(data)));
            if data == b"first" {
                group.handle_message(id, b"second", OpCode::Text);
                seen.push("outer-done");
            }
        });

        g.handle_message(id, b"first", OpCode::Text);
        assert_eq!(log.entries(), vec!["msg:first", "outer-done", "msg:second"]);
    }

    #[test]
    fn test_handler_may_mutate_membership_during_broadcast() {
        let log = EventLog::new();
        let mut g = group();
        let (conn_a, _) = TestConn::new("a", &log);
        let (conn_b, _) = TestConn::new("b", &log);
        let a = g.add(conn_a);
        g.add(conn_b);

        // A member disconnecting mid-traversal must not derail the walk
        let mut removed = false;
        g.for_each(|group, id| {
            if !removed {
                removed = true;
                group.remove(a);
            }
            let _ = group.connection(id);
        });
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_handle_pong_clears_probe_flag() {
        let log = EventLog::new();
        let mut g = group();
        let (conn, _) = TestConn::new("a", &log);
        let id = g.add(conn);

        g.registry.set_outstanding_probe(id);
        assert!(g.registry.has_outstanding_probe(id));

        g.handle_pong(id, b"");
        assert!(!g.registry.has_outstanding_probe(id));
    }

    #[test]
    fn test_handle_error_reaches_error_handler() {
        let log = EventLog::new();
        let mut g = group();
        let seen = log.clone();
        g.on_error(move |_, e| seen.push(format!("error:{}", e)));

        g.handle_error(GroupError::Listen(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        )));
        assert_eq!(
            log.entries(),
            vec!["error:Listener failed: address in use"]
        );
    }
}
