//! Server-role listen-state resource
//!
//! Holds the listening socket released by `Group::stop_listening`.
//! Closing is synchronous: the listener belongs to the group alone, so
//! dropping it closes the OS socket immediately. Embedders that run the
//! accept loop in its own task hand over that task's abort handle too,
//! so stopping the group also stops accepting.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::AbortHandle;

use super::ListenState;

/// Listen state backed by a tokio `TcpListener`
pub struct TcpListenState {
    listener: Option<TcpListener>,
    accept_task: Option<AbortHandle>,
    local_addr: Option<SocketAddr>,
}

impl TcpListenState {
    /// Take ownership of a bound listener.
    pub fn new(listener: TcpListener) -> Self {
        let local_addr = listener.local_addr().ok();
        Self {
            listener: Some(listener),
            accept_task: None,
            local_addr,
        }
    }

    /// Track the accept loop's task so closing the socket also aborts
    /// the loop draining it. The task is expected to own nothing but
    /// borrowed accept work; aborting it drops any listener it moved in.
    pub fn with_accept_task(mut self, accept_task: AbortHandle) -> Self {
        self.accept_task = Some(accept_task);
        self
    }

    /// For accept loops that own the listener themselves: track only
    /// the task, closing by abort.
    pub fn for_accept_task(accept_task: AbortHandle) -> Self {
        Self {
            listener: None,
            accept_task: Some(accept_task),
            local_addr: None,
        }
    }

    /// The bound address, when the listener is held here
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl ListenState for TcpListenState {
    fn close_socket(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        if let Some(listener) = self.listener.take() {
            drop(listener);
        }
        tracing::debug!(addr = ?self.local_addr, "Listening socket closed");
    }
}
