//! Error types for Meridian.

use thiserror::Error;

/// The main error type for Meridian operations.
///
/// Every variant except [`FailedExec`](MeridianError::FailedExec) describes a
/// misuse of the public API. Such calls fail before any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeridianError {
    /// The display was accessed from a thread other than the one that created it.
    #[error("invalid thread access: the display belongs to another thread")]
    ThreadInvalidAccess,

    /// The widget has already been disposed.
    #[error("widget is disposed")]
    WidgetDisposed,

    /// The display has already been disposed.
    #[error("display is disposed")]
    DeviceDisposed,

    /// An argument was out of range or referred to an unsuitable widget.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Work submitted through `sync_exec` panicked on the UI thread.
    #[error("failed to execute runnable: {0}")]
    FailedExec(String),

    /// A blocking request was made from the thread that would have to serve it.
    #[error("sync_exec through a handle would block the user-interface thread")]
    WouldBlock,

    /// Timer-related error.
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),
}

/// Timer-specific errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The timer id is invalid or the timer has been destroyed.
    #[error("invalid timer id")]
    InvalidTimerId,
}

/// A specialized Result type for Meridian operations.
pub type Result<T> = std::result::Result<T, MeridianError>;
