//! Tokio-backed keep-alive timer
//!
//! A `TokioTimer` is a task on the current `LocalSet` select-looping
//! over interval ticks, a stop signal, and a close request. The
//! close-completion closure travels to the task over a oneshot and runs
//! there just before the task exits, so the timer's backing state is
//! released from the loop, never at the `close_async` call site.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};

use crate::connection::Connection;
use crate::group::Group;

use super::{OnClosed, TimerResource};

/// Recurring timer driving a tick callback on the owning thread
pub struct TokioTimer {
    stop_tx: watch::Sender<bool>,
    close_tx: Option<oneshot::Sender<OnClosed>>,
}

impl TokioTimer {
    /// Arm a recurring timer. Must be called inside a `LocalSet`; the
    /// callback runs on the current thread every `interval`.
    pub fn spawn_local(interval: Duration, mut on_tick: Box<dyn FnMut()>) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (close_tx, mut close_rx) = oneshot::channel::<OnClosed>();

        tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first interval tick completes immediately; swallow it
            // so ticks land at interval boundaries.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // The stop signal does not wake this select, so a
                        // tick may land after stop(); check at fire time.
                        if !*stop_rx.borrow() {
                            on_tick();
                        }
                    }
                    res = &mut close_rx => {
                        if let Ok(on_closed) = res {
                            on_closed();
                        }
                        break;
                    }
                }
            }
            tracing::trace!("Timer task exited");
        });

        Self {
            stop_tx,
            close_tx: Some(close_tx),
        }
    }
}

impl TimerResource for TokioTimer {
    fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
    }

    fn close_async(mut self: Box<Self>, on_closed: OnClosed) {
        if let Some(tx) = self.close_tx.take() {
            if let Err(unsent) = tx.send(on_closed) {
                // Task already gone; nothing left to release on the loop
                unsent();
            }
        }
    }
}

/// Wire a group's keep-alive to a `TokioTimer`: every tick calls
/// `on_probe_tick`, and the armed timer is handed to the group so
/// `close` can retire it. Must be called inside a `LocalSet`.
pub fn spawn_keep_alive<C: Connection + 'static>(group: &Rc<RefCell<Group<C>>>) {
    let interval = group.borrow().ping_interval();
    let weak = Rc::downgrade(group);
    let timer = TokioTimer::spawn_local(
        interval,
        Box::new(move || {
            if let Some(group) = weak.upgrade() {
                group.borrow_mut().on_probe_tick();
            }
        }),
    );
    group.borrow_mut().start_keep_alive(Box::new(timer), None);
}
