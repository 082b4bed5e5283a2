//! WebSocket connection-group management
//!
//! A [`Group`] is a set of live WebSocket connections (server-side or
//! client-side) sharing configuration, event handlers, and group-wide
//! operations:
//!
//! - **Membership**: O(1) insert/remove with traversal that stays safe
//!   while handlers mutate membership mid-walk
//! - **Broadcast**: one message encoded once, shared zero-copy by
//!   every member's send path
//! - **Keep-alive**: timer-driven probing that silently reaps members
//!   that stop answering
//! - **Teardown**: graceful (`close`) or hard (`terminate`), with
//!   loop-owned resources released only from their own close
//!   completions
//!
//! The crate does no I/O of its own: transports join as opaque
//! [`Connection`] handles, and event-loop resources plug in through the
//! traits in [`eventloop`] (tokio-backed implementations included).
//!
//! Everything on a group runs on the one thread driving its event
//! loop; the only cross-thread path is the wakeup primitive.
//!
//! ```no_run
//! use ws_group::{Group, GroupConfig, LoopContext, Role};
//! # use ws_group::{Connection, PreparedMessage};
//! # struct MyConn;
//! # impl Connection for MyConn {
//! #     fn send_prepared(&mut self, _: &PreparedMessage) {}
//! #     fn terminate(&mut self) {}
//! #     fn close(&mut self, _: u16, _: &[u8]) {}
//! # }
//!
//! let mut group: Group<MyConn> =
//!     Group::new(Role::Server, GroupConfig::default(), LoopContext::default());
//!
//! group.on_message(|group, id, data, opcode| {
//!     // Handlers may mutate membership or broadcast reentrantly
//!     let echo = data.to_vec();
//!     group.broadcast(&echo, opcode);
//! });
//! # let _ = &mut group;
//! ```

pub mod connection;
pub mod error;
pub mod eventloop;
pub mod group;
pub mod protocol;
pub mod registry;

#[cfg(test)]
pub(crate) mod testutil;

pub use connection::Connection;
pub use error::{GroupError, Result};
pub use group::{Group, GroupConfig, LoopContext, Role, UpgradeInfo};
pub use protocol::{OpCode, PreparedMessage};
pub use registry::{ConnId, ConnectionRegistry};
