//! Keep-alive probing
//!
//! Each timer tick makes one pass over the membership: a member still
//! flagged from the previous tick never answered its probe and is
//! force-terminated; everyone else gets flagged. The survivors then
//! receive exactly one probe message: the custom payload as a text
//! frame when configured, an empty protocol-level ping otherwise.
//!
//! An unanswered probe is not an error; the stale member is terminated
//! silently and its disconnection handler fires with the abnormal close
//! code. Pong handling lives with the transport collaborator, which
//! clears the flag through `Group::acknowledge_pong` (or the
//! `handle_pong` entry point).

use std::time::Duration;

use bytes::Bytes;

use crate::connection::Connection;
use crate::eventloop::TimerResource;
use crate::protocol::OpCode;
use crate::registry::ConnId;

use super::Group;

impl<C: Connection> Group<C> {
    /// Install the armed keep-alive timer resource. The embedder (or
    /// `eventloop::spawn_keep_alive`) wires the timer's ticks to
    /// `on_probe_tick`. A `Some` payload replaces the configured one.
    ///
    /// A group owns at most one timer; installing a new one closes the
    /// previous resource first.
    pub fn start_keep_alive(&mut self, timer: Box<dyn TimerResource>, payload: Option<Bytes>) {
        if let Some(mut old) = self.timer.take() {
            tracing::warn!("Keep-alive timer replaced; closing previous timer");
            old.stop();
            old.close_async(Box::new(|| {}));
        }
        self.timer = Some(timer);
        if payload.is_some() {
            self.ping_payload = payload;
        }
    }

    /// Interval the group was configured to probe at
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }

    /// One probe tick: reap members that never answered the previous
    /// probe, flag the rest, then ping the survivors once.
    pub fn on_probe_tick(&mut self) {
        self.for_each(|group, id| {
            if group.registry.has_outstanding_probe(id) {
                tracing::debug!(conn = %id, "Probe unanswered; terminating");
                group.terminate_member(id);
            } else {
                group.registry.set_outstanding_probe(id);
            }
        });

        match self.ping_payload.clone() {
            Some(payload) => self.broadcast(&payload, OpCode::Text),
            None => self.broadcast(&[], OpCode::Ping),
        }
    }

    /// The member answered a probe: clear its outstanding-probe flag.
    pub fn acknowledge_pong(&mut self, id: ConnId) {
        self.registry.clear_outstanding_probe(id);
    }

    /// Whether `id` has a probe it has not answered yet
    pub fn has_outstanding_probe(&self, id: ConnId) -> bool {
        self.registry.has_outstanding_probe(id)
    }
}
