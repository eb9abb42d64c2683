//! Cross-thread work queue served by the user-interface thread.
//!
//! Any thread may hand work to the UI thread with
//! [`Synchronizer::async_exec`] (fire and forget) or
//! [`Synchronizer::sync_exec`] (block until the work has run and receive its
//! result). The UI thread drains the queue with
//! [`Synchronizer::run_async_messages`], passing its own context to each
//! piece of work.
//!
//! # How It Works
//!
//! 1. Work is boxed and appended to a FIFO under a mutex.
//! 2. The registered [`Wake`] is poked so a sleeping UI thread notices.
//! 3. `sync_exec` callers block on a one-slot channel. The boxed work owns
//!    the sending half, so if the work is dropped unrun (the synchronizer was
//!    disposed) the caller wakes with [`MeridianError::DeviceDisposed`].

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crossbeam_channel::bounded;
use parking_lot::Mutex;

use crate::error::{MeridianError, Result};
use crate::thread_check::ThreadAffinity;

/// Something that can interrupt a blocked UI thread.
pub trait Wake: Send + Sync {
    /// Wake the UI thread if it is blocked waiting for events.
    fn wake(&self);
}

/// A boxed unit of work run with the UI thread's context.
pub type Work<C> = Box<dyn FnOnce(&mut C) + Send>;

struct Queue<C> {
    messages: VecDeque<Work<C>>,
    disposed: bool,
}

/// Queue of work requested for the UI thread.
pub struct Synchronizer<C> {
    queue: Mutex<Queue<C>>,
    affinity: ThreadAffinity,
    waker: Arc<dyn Wake>,
}

static_assertions::assert_impl_all!(Synchronizer<()>: Send, Sync);

impl<C> Synchronizer<C> {
    /// Create a synchronizer owned by the calling thread.
    pub fn new(waker: Arc<dyn Wake>) -> Self {
        Self {
            queue: Mutex::new(Queue {
                messages: VecDeque::new(),
                disposed: false,
            }),
            affinity: ThreadAffinity::current(),
            waker,
        }
    }

    fn push(&self, work: Work<C>) -> Result<()> {
        {
            let mut queue = self.queue.lock();
            if queue.disposed {
                return Err(MeridianError::DeviceDisposed);
            }
            queue.messages.push_back(work);
        }
        self.waker.wake();
        Ok(())
    }

    /// Queue `work` and return immediately.
    pub fn async_exec<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.push(Box::new(work))
    }

    /// Queue `work` and block until the UI thread has run it.
    ///
    /// A panic inside `work` is caught on the UI thread and relayed here as
    /// [`MeridianError::FailedExec`]. Calling this from the UI thread itself
    /// fails with [`MeridianError::WouldBlock`], since nothing could serve
    /// the request while the caller waits.
    pub fn sync_exec<F, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.affinity.is_same_thread() {
            return Err(MeridianError::WouldBlock);
        }

        let (sender, receiver) = bounded::<Result<R>>(1);
        self.push(Box::new(move |context: &mut C| {
            let outcome = catch_unwind(AssertUnwindSafe(|| work(context)))
                .map_err(|payload| MeridianError::FailedExec(panic_message(payload.as_ref())));
            if let Err(MeridianError::FailedExec(message)) = &outcome {
                tracing::warn!(target: "meridian_core::sync", %message, "sync_exec work panicked");
            }
            // The caller may have given up; nothing to report then.
            let _ = sender.send(outcome);
        }))?;

        receiver
            .recv()
            .unwrap_or(Err(MeridianError::DeviceDisposed))
    }

    /// Number of queued messages.
    pub fn message_count(&self) -> usize {
        self.queue.lock().messages.len()
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.queue.lock().disposed
    }

    /// Run one queued message, or every message queued so far when `all` is
    /// set. Returns `true` if anything ran.
    ///
    /// Must be called on the owning thread. Panics raised by async work are
    /// caught and passed to `on_panic`; the queue stays consistent either way.
    pub fn run_async_messages(
        &self,
        context: &mut C,
        all: bool,
        mut on_panic: impl FnMut(&mut C, String),
    ) -> bool {
        self.affinity.debug_assert_same_thread();

        let mut budget = if all { self.message_count() } else { 1 };
        let mut ran = false;
        while budget > 0 {
            budget -= 1;
            // Never hold the lock while work runs; work may queue more work.
            let Some(work) = self.queue.lock().messages.pop_front() else {
                break;
            };
            ran = true;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| work(context))) {
                on_panic(context, panic_message(payload.as_ref()));
            }
        }
        ran
    }

    /// Refuse further work and drop everything still queued.
    ///
    /// Blocked `sync_exec` callers return [`MeridianError::DeviceDisposed`].
    pub fn dispose(&self) {
        let dropped = {
            let mut queue = self.queue.lock();
            queue.disposed = true;
            std::mem::take(&mut queue.messages)
        };
        if !dropped.is_empty() {
            tracing::debug!(
                target: "meridian_core::sync",
                count = dropped.len(),
                "dropping queued work on dispose"
            );
        }
        drop(dropped);
    }

    /// Wake the serving thread.
    pub fn wake(&self) {
        self.waker.wake();
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
