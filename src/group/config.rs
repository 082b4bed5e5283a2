//! Group configuration

use std::time::Duration;

use bytes::Bytes;

use crate::protocol::{CLIENT_NO_CONTEXT_TAKEOVER, NO_OPTIONS, SERVER_NO_CONTEXT_TAKEOVER};

/// Which side of the protocol this group's members sit on
///
/// Role-specific behavior is confined to lifecycle: only server groups
/// carry a listen-state resource to release on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Members were accepted by a listener this group owns
    Server,
    /// Members were connected outward; no listener to release
    Client,
}

/// Per-event-loop shared state, copied into each group at construction
#[derive(Debug, Clone)]
pub struct LoopContext {
    /// Identifies the owning loop in logs
    pub loop_id: usize,

    /// Largest payload the loop's transports will accept
    pub max_payload_len: usize,
}

impl Default for LoopContext {
    fn default() -> Self {
        Self {
            loop_id: 0,
            max_payload_len: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Group configuration options
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Extension-option bitmask requested by the embedder
    ///
    /// The group always ORs in `SERVER_NO_CONTEXT_TAKEOVER` and
    /// `CLIENT_NO_CONTEXT_TAKEOVER`, whatever is set here.
    pub extension_options: u32,

    /// Keep-alive probe interval
    pub ping_interval: Duration,

    /// Custom keep-alive payload, sent as a text frame instead of a
    /// protocol-level ping when set
    pub ping_payload: Option<Bytes>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            extension_options: NO_OPTIONS,
            ping_interval: Duration::from_secs(30),
            ping_payload: None,
        }
    }
}

impl GroupConfig {
    /// Set the requested extension options
    pub fn extension_options(mut self, options: u32) -> Self {
        self.extension_options = options;
        self
    }

    /// Set the keep-alive probe interval
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Use a custom text payload for keep-alive probes
    pub fn ping_payload(mut self, payload: Bytes) -> Self {
        self.ping_payload = Some(payload);
        self
    }

    /// Options as the group will actually apply them
    pub fn effective_options(&self) -> u32 {
        self.extension_options | SERVER_NO_CONTEXT_TAKEOVER | CLIENT_NO_CONTEXT_TAKEOVER
    }
}
