//! Thread affinity checks for the user-interface thread.
//!
//! A [`Display`](../../meridian/struct.Display.html) is owned by the thread
//! that created it. Every public entry point records nothing and mutates
//! nothing until [`ThreadAffinity::check`] has confirmed the caller is that
//! thread.
//!
//! ```
//! use meridian_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! assert!(affinity.check().is_ok());
//!
//! let result = std::thread::spawn(move || affinity.check()).join().unwrap();
//! assert!(result.is_err());
//! ```

use std::thread::ThreadId;

use crate::error::{MeridianError, Result};

/// Records the thread an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Whether the calling thread is the owning thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Fail with [`MeridianError::ThreadInvalidAccess`] off the owning thread.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_same_thread() {
            Ok(())
        } else {
            Err(MeridianError::ThreadInvalidAccess)
        }
    }

    /// Panic if called off the owning thread. Debug builds only.
    ///
    /// Used by internals that cannot report an error.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        debug_assert!(
            self.is_same_thread(),
            "accessed off the user-interface thread {:?}; queue the work with async_exec or sync_exec",
            self.thread_id
        );
    }
}
