//! Tokio-backed async-wakeup resource
//!
//! The one cross-thread path into a group's loop: other threads post
//! callbacks through a `WakeupHandle`, and a task on the owning
//! `LocalSet` drains and runs them on the group's thread. The group
//! itself only ever tears the resource down; posting is the embedder's
//! side of the contract.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{oneshot, Notify};

use super::{OnClosed, WakeupResource};

type Job = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Shared {
    notify: Notify,
    queue: Mutex<VecDeque<Job>>,
}

impl Shared {
    fn drain(&self) {
        loop {
            let job = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match job {
                Some(job) => job(),
                None => break,
            }
        }
    }
}

/// Loop-owned side of the wakeup primitive, held by a group
pub struct TokioWakeup {
    close_tx: Option<oneshot::Sender<OnClosed>>,
}

/// Cloneable, `Send` handle other threads use to post work onto the
/// owning loop
#[derive(Clone)]
pub struct WakeupHandle {
    shared: Arc<Shared>,
}

impl WakeupHandle {
    /// Queue `job` to run on the owning loop's thread.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Box::new(job));
        self.shared.notify.notify_one();
    }
}

impl TokioWakeup {
    /// Spawn the draining task on the current `LocalSet`. Returns the
    /// loop-owned resource (for the group) and the posting handle (for
    /// other threads).
    pub fn spawn_local() -> (Self, WakeupHandle) {
        let shared = Arc::new(Shared::default());
        let (close_tx, mut close_rx) = oneshot::channel::<OnClosed>();

        let task_shared = Arc::clone(&shared);
        tokio::task::spawn_local(async move {
            loop {
                tokio::select! {
                    _ = task_shared.notify.notified() => task_shared.drain(),
                    res = &mut close_rx => {
                        // Run anything posted before the close request
                        task_shared.drain();
                        if let Ok(on_closed) = res {
                            on_closed();
                        }
                        break;
                    }
                }
            }
            tracing::trace!("Wakeup task exited");
        });

        (
            Self {
                close_tx: Some(close_tx),
            },
            WakeupHandle { shared },
        )
    }
}

impl WakeupResource for TokioWakeup {
    fn close_async(mut self: Box<Self>, on_closed: OnClosed) {
        if let Some(tx) = self.close_tx.take() {
            if let Err(unsent) = tx.send(on_closed) {
                unsent();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_posted_job_runs_on_owning_thread() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (_wakeup, handle) = TokioWakeup::spawn_local();

                let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
                let flag = Arc::clone(&ran);
                let poster = std::thread::spawn(move || {
                    handle.post(move || flag.store(true, std::sync::atomic::Ordering::SeqCst));
                });
                poster.join().unwrap();

                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
            })
            .await;
    }

    #[tokio::test]
    async fn test_close_drains_pending_jobs_before_completion() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (wakeup, handle) = TokioWakeup::spawn_local();

                let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
                let job_flag = Arc::clone(&ran);
                handle.post(move || job_flag.store(true, std::sync::atomic::Ordering::SeqCst));

                let closed = Rc::new(Cell::new(false));
                let close_flag = Rc::clone(&closed);
                Box::new(wakeup).close_async(Box::new(move || close_flag.set(true)));

                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
                assert!(closed.get());
            })
            .await;
    }
}
