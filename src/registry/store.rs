//! Registry implementation
//!
//! Slab-backed doubly linked membership list with an explicit stack of
//! traversal cursors. Insert and remove are O(1); traversal visits each
//! live member exactly once even while callbacks mutate membership.

use slab::Slab;

use super::entry::{ConnId, Record};

/// Membership registry for one group
///
/// `T` is the embedder's connection handle; the registry itself never
/// invokes it, it only stores and orders members.
#[derive(Debug)]
pub struct ConnectionRegistry<T> {
    slots: Slab<Record<T>>,

    /// Most recently inserted member, start of every traversal
    head: Option<ConnId>,

    /// One cursor per active traversal; nested traversals stack
    cursors: Vec<Option<ConnId>>,

    next_generation: u64,
}

impl<T> ConnectionRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: Slab::new(),
            head: None,
            cursors: Vec::new(),
            next_generation: 0,
        }
    }

    /// Number of live members
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry has no members
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current head of the membership list
    pub fn head(&self) -> Option<ConnId> {
        self.head
    }

    /// Whether `id` still resolves to a live member
    pub fn contains(&self, id: ConnId) -> bool {
        self.record(id).is_some()
    }

    /// Successor of `id` in the list, if `id` is live
    pub fn next(&self, id: ConnId) -> Option<ConnId> {
        self.record(id).and_then(|r| r.next)
    }

    /// Predecessor of `id` in the list, if `id` is live
    pub fn prev(&self, id: ConnId) -> Option<ConnId> {
        self.record(id).and_then(|r| r.prev)
    }

    /// Borrow the connection handle of a live member
    pub fn get(&self, id: ConnId) -> Option<&T> {
        self.record(id).map(|r| &r.conn)
    }

    /// Mutably borrow the connection handle of a live member
    pub fn get_mut(&mut self, id: ConnId) -> Option<&mut T> {
        self.record_mut(id).map(|r| &mut r.conn)
    }

    /// Insert a new member at the head of the list. O(1).
    pub fn insert(&mut self, conn: T) -> ConnId {
        let generation = self.next_generation;
        self.next_generation += 1;

        let index = self.slots.insert(Record::new(generation, conn));
        let id = ConnId { index, generation };

        if let Some(old_head) = self.head.take() {
            self.slots[old_head.index].prev = Some(id);
            self.slots[index].next = Some(old_head);
        }
        self.head = Some(id);

        tracing::trace!(conn = %id, members = self.slots.len(), "Member inserted");
        id
    }

    /// Unlink and drop a member, returning its connection handle. O(1).
    ///
    /// Every active cursor currently resting on `id` is advanced to the
    /// member's successor first, so in-progress traversals never touch
    /// the removed slot again.
    ///
    /// Precondition: `id` must be a current member. Removing a stale id
    /// is a caller bug, caught by `debug_assert!` and ignored in
    /// release builds.
    pub fn remove(&mut self, id: ConnId) -> Option<T> {
        if self.record(id).is_none() {
            debug_assert!(false, "remove of non-member {}", id);
            return None;
        }

        let record = &self.slots[id.index];
        let (prev, next) = (record.prev, record.next);

        for cursor in &mut self.cursors {
            if *cursor == Some(id) {
                *cursor = next;
            }
        }

        match (prev, next) {
            (None, None) => {
                // Sole member
                debug_assert_eq!(self.head, Some(id));
                self.head = None;
            }
            (None, Some(next_id)) => {
                // Head of a longer list
                self.slots[next_id.index].prev = None;
                self.head = Some(next_id);
            }
            (Some(prev_id), next) => {
                // Interior or tail
                self.slots[prev_id.index].next = next;
                if let Some(next_id) = next {
                    self.slots[next_id.index].prev = Some(prev_id);
                }
            }
        }

        let record = self.slots.remove(id.index);
        tracing::trace!(conn = %id, members = self.slots.len(), "Member removed");
        Some(record.conn)
    }

    /// Visit every live member once.
    ///
    /// The callback receives the registry back, so it may remove any
    /// member (including the one being visited) or start a nested
    /// traversal; each nesting level walks on its own cursor.
    pub fn for_each(&mut self, mut visit: impl FnMut(&mut Self, ConnId)) {
        self.push_cursor();
        while let Some(id) = self.cursor() {
            visit(self, id);
            self.advance_cursor_past(id);
        }
        self.pop_cursor();
    }

    /// Begin a traversal: push a cursor resting on the current head.
    pub fn push_cursor(&mut self) {
        self.cursors.push(self.head);
    }

    /// Member the innermost cursor currently rests on
    pub fn cursor(&self) -> Option<ConnId> {
        self.cursors.last().copied().flatten()
    }

    /// Step the innermost cursor past `visited`.
    ///
    /// Reads the cursor's current value rather than anything cached
    /// before the visit: if a removal already advanced the cursor away
    /// from `visited`, this is a no-op.
    pub fn advance_cursor_past(&mut self, visited: ConnId) {
        if let Some(cursor) = self.cursors.last_mut() {
            if *cursor == Some(visited) {
                *cursor = self
                    .slots
                    .get(visited.index)
                    .filter(|r| r.generation == visited.generation)
                    .and_then(|r| r.next);
            }
        }
    }

    /// End the innermost traversal.
    pub fn pop_cursor(&mut self) {
        self.cursors.pop();
    }

    /// Mark `id` as having an unanswered probe. Returns the previous
    /// flag value, `None` if `id` is stale.
    pub fn set_outstanding_probe(&mut self, id: ConnId) -> Option<bool> {
        self.record_mut(id).map(|r| {
            let prev = r.outstanding_probe;
            r.outstanding_probe = true;
            prev
        })
    }

    /// Whether `id` has an unanswered probe
    pub fn has_outstanding_probe(&self, id: ConnId) -> bool {
        self.record(id).map(|r| r.outstanding_probe).unwrap_or(false)
    }

    /// Clear the unanswered-probe flag, called on receipt of a matching pong
    pub fn clear_outstanding_probe(&mut self, id: ConnId) {
        if let Some(r) = self.record_mut(id) {
            r.outstanding_probe = false;
        }
    }

    fn record(&self, id: ConnId) -> Option<&Record<T>> {
        self.slots
            .get(id.index)
            .filter(|r| r.generation == id.generation)
    }

    fn record_mut(&mut self, id: ConnId) -> Option<&mut Record<T>> {
        self.slots
            .get_mut(id.index)
            .filter(|r| r.generation == id.generation)
    }
}

impl<T> Default for ConnectionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
