//! Group teardown
//!
//! A group goes from active to stopped exactly once, through
//! `terminate` (hard) or `close` (graceful). Both end in
//! `stop_listening`, which releases the server-role listener and the
//! async-wakeup resource; `close` additionally retires the keep-alive
//! timer. Loop-owned resources (timer, wakeup) are released inside
//! their own close-completion callbacks, never at the call site; the
//! listener is group-owned and closes synchronously.

use crate::connection::Connection;
use crate::eventloop::{ListenState, WakeupResource};
use crate::protocol::CLOSE_ABNORMAL;
use crate::registry::ConnId;

use super::config::Role;
use super::handlers::{dispatch, PendingEvent};
use super::Group;

impl<C: Connection> Group<C> {
    /// Install the server-role listen state to release on shutdown.
    pub fn set_listen_state(&mut self, listen: Box<dyn ListenState>) {
        debug_assert_eq!(self.role(), Role::Server, "listen state on client group");
        self.listen = Some(listen);
    }

    /// Install the async-wakeup resource to release on shutdown.
    pub fn set_wakeup(&mut self, wakeup: Box<dyn WakeupResource>) {
        self.wakeup = Some(wakeup);
    }

    /// Hard-close one member: no close handshake, immediate removal,
    /// disconnection handler fired with the abnormal close code.
    pub fn terminate_member(&mut self, id: ConnId) {
        if let Some(mut conn) = self.registry.remove(id) {
            conn.terminate();
            dispatch!(
                self,
                disconnection,
                defer PendingEvent::Disconnection(id, CLOSE_ABNORMAL, Vec::new()),
                |h| h(self, id, CLOSE_ABNORMAL, &[])
            );
        }
    }

    /// Stop accepting new members and release shutdown resources.
    ///
    /// Server role only: closes the listening socket and drops the
    /// listen state. Any wakeup resource gets an asynchronous close;
    /// its backing state is released inside that close's completion.
    pub fn stop_listening(&mut self) {
        if self.role() == Role::Server {
            if let Some(mut listen) = self.listen.take() {
                listen.close_socket();
                tracing::debug!("Listen state released");
            }
        }

        if let Some(wakeup) = self.wakeup.take() {
            let loop_id = self.loop_context().loop_id;
            wakeup.close_async(Box::new(move || {
                tracing::debug!(loop_id, "Wakeup resource released");
            }));
        }
    }

    /// Tear the group down hard: terminate every member (no close
    /// frame), then stop listening. The keep-alive timer, if any, is
    /// left to `close` or to drop.
    pub fn terminate(&mut self) {
        tracing::info!(members = self.len(), "Group terminating");
        self.for_each(|group, id| {
            group.terminate_member(id);
        });
        self.stop_listening();
    }

    /// Tear the group down gracefully: send a close frame carrying
    /// `code` and `reason` to every member, stop listening, then stop
    /// and release the keep-alive timer inside its own close
    /// completion.
    pub fn close(&mut self, code: u16, reason: &[u8]) {
        tracing::info!(members = self.len(), code, "Group closing");
        self.for_each(|group, id| {
            if let Some(conn) = group.registry.get_mut(id) {
                conn.close(code, reason);
            }
        });
        self.stop_listening();

        if let Some(mut timer) = self.timer.take() {
            timer.stop();
            timer.close_async(Box::new(|| {
                tracing::debug!("Keep-alive timer released");
            }));
        }
    }
}
