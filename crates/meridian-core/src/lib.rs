//! Core systems for Meridian.
//!
//! This crate provides the thread-independent building blocks of the
//! Meridian native-event bridge:
//!
//! - **Thread affinity**: the check-and-fail guard used at every public entry
//!   point of a display
//! - **Timers**: identity-keyed one-shot timers, where rescheduling replaces
//!   and a negative delay cancels
//! - **Synchronizer**: `async_exec`/`sync_exec` queues served by the UI thread
//! - **Errors**: the [`MeridianError`] taxonomy shared by all crates
//!
//! # Synchronizer Example
//!
//! ```
//! use std::sync::Arc;
//! use meridian_core::{Synchronizer, Wake};
//!
//! struct NoopWaker;
//! impl Wake for NoopWaker {
//!     fn wake(&self) {}
//! }
//!
//! let sync: Synchronizer<Vec<&'static str>> = Synchronizer::new(Arc::new(NoopWaker));
//! sync.async_exec(|log| log.push("hello")).unwrap();
//!
//! let mut log = Vec::new();
//! sync.run_async_messages(&mut log, true, |_, _| {});
//! assert_eq!(log, ["hello"]);
//! ```

pub mod error;
pub mod logging;
pub mod synchronizer;
pub mod thread_check;
pub mod timer;

pub use error::{MeridianError, Result, TimerError};
pub use synchronizer::{Synchronizer, Wake, Work, panic_message};
pub use thread_check::ThreadAffinity;
pub use timer::{TimerId, TimerQueue};
