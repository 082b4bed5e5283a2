//! Membership record types
//!
//! This module defines the stable id handed out for each member and the
//! per-member record stored in the registry's slab.

/// Stable, generation-checked id of one registry member
///
/// The index addresses a slab slot; the generation distinguishes the
/// current occupant from any previous occupant of the same slot, so an
/// id held across a removal can never resolve to a different member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}.{}", self.index, self.generation)
    }
}

/// Per-member record: membership links plus keep-alive state
#[derive(Debug)]
pub(crate) struct Record<T> {
    /// Generation of the slot's current occupant
    pub(crate) generation: u64,

    /// Previous member in the list (`None` at the head)
    pub(crate) prev: Option<ConnId>,

    /// Next member in the list (`None` at the tail)
    pub(crate) next: Option<ConnId>,

    /// Set on each probe tick, cleared when a matching pong arrives
    pub(crate) outstanding_probe: bool,

    /// The embedder's connection handle
    pub(crate) conn: T,
}

impl<T> Record<T> {
    pub(crate) fn new(generation: u64, conn: T) -> Self {
        Self {
            generation,
            prev: None,
            next: None,
            outstanding_probe: false,
            conn,
        }
    }
}
