//! Thread-safe access to a display's work queue.

use std::sync::Arc;

use meridian_core::{Result, Synchronizer};

use super::Display;

/// A `Send + Sync` handle for requesting work on the display's thread.
///
/// Obtained from [`Display::handle`]. Every method may be called from any
/// thread.
#[derive(Clone)]
pub struct DisplayHandle {
    pub(super) synchronizer: Arc<Synchronizer<Display>>,
}

static_assertions::assert_impl_all!(DisplayHandle: Send, Sync);

impl std::fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("pending", &self.synchronizer.message_count())
            .field("disposed", &self.synchronizer.is_disposed())
            .finish()
    }
}

impl DisplayHandle {
    /// Queue `work` to run on the display's thread and return immediately.
    ///
    /// Fails with `DeviceDisposed` once the display is gone.
    pub fn async_exec<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce(&mut Display) + Send + 'static,
    {
        self.synchronizer.async_exec(work)
    }

    /// Run `work` on the display's thread and wait for its result.
    ///
    /// A panic in `work` comes back as `FailedExec`. Called on the display's
    /// own thread this fails with `WouldBlock`; use [`Display::sync_exec`]
    /// there instead.
    pub fn sync_exec<F, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&mut Display) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.synchronizer.sync_exec(work)
    }

    /// Interrupt a blocked [`Display::sleep`].
    pub fn wake(&self) {
        self.synchronizer.wake();
    }

    /// Whether the display has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.synchronizer.is_disposed()
    }
}
