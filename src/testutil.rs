//! Test doubles shared by the unit tests
//!
//! Everything records into a single `EventLog` so ordering-sensitive
//! tests (shutdown, keep-alive reaping) can assert one flat sequence.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bytes::Bytes;

use crate::connection::Connection;
use crate::eventloop::{ListenState, OnClosed, TimerResource, WakeupResource};
use crate::protocol::PreparedMessage;

/// Shared, clonable event recorder
#[derive(Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Connection double: logs calls, keeps the shared frames it was sent
pub(crate) struct TestConn {
    name: &'static str,
    log: EventLog,
    frames: Rc<RefCell<Vec<Bytes>>>,
}

impl TestConn {
    pub(crate) fn new(name: &'static str, log: &EventLog) -> (Self, Rc<RefCell<Vec<Bytes>>>) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                name,
                log: log.clone(),
                frames: Rc::clone(&frames),
            },
            frames,
        )
    }
}

impl Connection for TestConn {
    fn send_prepared(&mut self, msg: &PreparedMessage) {
        self.log.push(format!("send:{}", self.name));
        self.frames.borrow_mut().push(msg.frame().clone());
    }

    fn terminate(&mut self) {
        self.log.push(format!("terminate:{}", self.name));
    }

    fn close(&mut self, code: u16, reason: &[u8]) {
        self.log.push(format!(
            "close:{}:{}:{}",
            self.name,
            code,
            String::from_utf8_lossy(reason)
        ));
    }
}

/// Timer double completing its close synchronously
pub(crate) struct TestTimer {
    log: EventLog,
    released: Rc<Cell<bool>>,
}

impl TestTimer {
    pub(crate) fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            released: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn released(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.released)
    }
}

impl TimerResource for TestTimer {
    fn stop(&mut self) {
        self.log.push("timer-stopped");
    }

    fn close_async(self: Box<Self>, on_closed: OnClosed) {
        self.log.push("timer-released");
        self.released.set(true);
        on_closed();
    }
}

/// Wakeup double completing its close synchronously
pub(crate) struct TestWakeup {
    log: EventLog,
}

impl TestWakeup {
    pub(crate) fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl WakeupResource for TestWakeup {
    fn close_async(self: Box<Self>, on_closed: OnClosed) {
        self.log.push("wakeup-released");
        on_closed();
    }
}

/// Listen-state double
pub(crate) struct TestListen {
    log: EventLog,
}

impl TestListen {
    pub(crate) fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl ListenState for TestListen {
    fn close_socket(&mut self) {
        self.log.push("listener-closed");
    }
}
