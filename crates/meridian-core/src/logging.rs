//! Logging facilities for Meridian.
//!
//! Meridian uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("meridian::focus=debug,meridian::hover=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "meridian_core";
    /// Timer queue target.
    pub const TIMER: &str = "meridian_core::timer";
    /// Cross-thread synchronizer target.
    pub const SYNC: &str = "meridian_core::sync";
    /// Dispatch loop target.
    pub const DISPLAY: &str = "meridian::display";
    /// Focus tracker target.
    pub const FOCUS: &str = "meridian::focus";
    /// Enter/exit and hover tracker target.
    pub const HOVER: &str = "meridian::hover";
    /// Drag-gesture detector target.
    pub const DRAG: &str = "meridian::drag";
    /// Traversal engine target.
    pub const TRAVERSE: &str = "meridian::traverse";
    /// Visible-region cache target.
    pub const REGION: &str = "meridian::region";
    /// Listener failures.
    pub const LISTENER: &str = "meridian::listener";
}

#[cfg(test)]
mod tests {
    use super::targets;

    #[test]
    fn test_targets_are_nested_under_crate_roots() {
        for target in [targets::TIMER, targets::SYNC] {
            assert!(target.starts_with(targets::CORE));
        }
        for target in [
            targets::DISPLAY,
            targets::FOCUS,
            targets::HOVER,
            targets::DRAG,
            targets::TRAVERSE,
            targets::REGION,
            targets::LISTENER,
        ] {
            assert!(target.starts_with("meridian::"));
        }
    }
}
