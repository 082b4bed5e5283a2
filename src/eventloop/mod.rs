//! Event-loop collaborator contracts and their tokio implementations
//!
//! The group core never drives an event loop directly; it owns loop
//! resources only through the narrow traits below. The rule every
//! implementation must honor: a resource registered with the loop is
//! deallocated only inside its own close-completion callback, never
//! synchronously at the `close_async` call site, because the loop may
//! still reference the resource when close is requested.
//!
//! `timer`, `wakeup`, and `listener` provide tokio-backed
//! implementations for embedders running a current-thread runtime with
//! a `LocalSet`.

pub mod listener;
pub mod timer;
pub mod wakeup;

pub use listener::TcpListenState;
pub use timer::{spawn_keep_alive, TokioTimer};
pub use wakeup::{TokioWakeup, WakeupHandle};

/// Completion callback invoked once a loop resource has actually closed
pub type OnClosed = Box<dyn FnOnce()>;

/// Recurring timer owned by a group for keep-alive probing
pub trait TimerResource {
    /// Stop ticking; the resource itself stays alive until closed
    fn stop(&mut self);

    /// Request asynchronous close. The implementation must run
    /// `on_closed` (and release its own backing state) from the loop
    /// once the close has completed.
    fn close_async(self: Box<Self>, on_closed: OnClosed);
}

/// Cross-thread hand-off primitive owned by a group
///
/// The only operation the group performs on it is teardown; posting
/// work is the embedder's side of the contract.
pub trait WakeupResource {
    /// Request asynchronous close; `on_closed` runs once any queued
    /// callbacks have drained and the resource is released.
    fn close_async(self: Box<Self>, on_closed: OnClosed);
}

/// Server-role listening socket state
pub trait ListenState {
    /// Close the underlying socket. Unlike timers and wakeups the
    /// listener is owned by the group alone, so closing is synchronous.
    fn close_socket(&mut self);
}
