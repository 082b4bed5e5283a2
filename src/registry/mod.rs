//! Connection membership registry
//!
//! The registry tracks every live member of a group and supports
//! reentrant traversal: a visit callback may remove any member
//! (including the one being visited) or start a nested traversal
//! without invalidating the walk in progress.
//!
//! # Architecture
//!
//! ```text
//!        ConnectionRegistry<T>
//!   ┌───────────────────────────────┐
//!   │ slots: Slab<Record<T>>        │   records hold prev/next as
//!   │ head: Option<ConnId>          │   generation-checked ids, so
//!   │ cursors: Vec<Option<ConnId>>  │   insert/remove stay O(1) and
//!   └───────────────────────────────┘   stale ids can never resolve
//!              │
//!     head ──► [C] ◄──► [B] ◄──► [A]
//!              ▲
//!           cursors (one per active traversal, nested walks stack)
//! ```
//!
//! Removal repairs every cursor that references the removed member by
//! advancing it to the member's successor, which is what makes
//! mutation during traversal safe by construction rather than by
//! locking.

pub mod entry;
pub mod store;

pub use entry::ConnId;
pub use store::ConnectionRegistry;
