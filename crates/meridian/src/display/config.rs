//! Display configuration.

use std::time::Duration;

use crate::platform::Platform;

use super::Display;

/// Default delay before a resting pointer produces `MouseHover`.
pub const DEFAULT_HOVER_DELAY: Duration = Duration::from_millis(560);

/// Default drag hysteresis in logical pixels.
///
/// A press becomes a drag once the pointer has moved further than this in
/// either axis.
pub const DEFAULT_DRAG_HYSTERESIS: f32 = 5.0;

/// Default time the drag detector waits for further motion before treating a
/// held press as a drag.
pub const DEFAULT_DRAG_TIMEOUT: Duration = Duration::from_millis(500);

/// Default number of focus re-checks after listeners move focus re-entrantly.
pub const DEFAULT_MAX_FOCUS_PASSES: usize = 4;

/// Tunables for a [`Display`].
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Delay before `MouseHover` is delivered.
    pub hover_delay: Duration,
    /// Drag hysteresis in logical pixels.
    pub drag_hysteresis: f32,
    /// Look-ahead wait before a motionless press counts as a drag.
    pub drag_timeout: Duration,
    /// Bound on focus re-checks within one transition.
    pub max_focus_passes: usize,
    /// Whether a primary press focuses a focusable control.
    pub click_to_focus: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hover_delay: DEFAULT_HOVER_DELAY,
            drag_hysteresis: DEFAULT_DRAG_HYSTERESIS,
            drag_timeout: DEFAULT_DRAG_TIMEOUT,
            max_focus_passes: DEFAULT_MAX_FOCUS_PASSES,
            click_to_focus: true,
        }
    }
}

/// Builder for creating a [`Display`] with custom configuration.
#[derive(Debug, Default)]
pub struct DisplayBuilder {
    config: DisplayConfig,
}

impl DisplayBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hover delay.
    pub fn hover_delay(mut self, delay: Duration) -> Self {
        self.config.hover_delay = delay;
        self
    }

    /// Set the drag hysteresis.
    pub fn drag_hysteresis(mut self, pixels: f32) -> Self {
        self.config.drag_hysteresis = pixels;
        self
    }

    /// Set the drag look-ahead timeout.
    pub fn drag_timeout(mut self, timeout: Duration) -> Self {
        self.config.drag_timeout = timeout;
        self
    }

    /// Set the bound on re-entrant focus re-checks.
    pub fn max_focus_passes(mut self, passes: usize) -> Self {
        self.config.max_focus_passes = passes.max(1);
        self
    }

    /// Enable or disable click-to-focus.
    pub fn click_to_focus(mut self, enabled: bool) -> Self {
        self.config.click_to_focus = enabled;
        self
    }

    /// Build a display owned by the calling thread.
    pub fn build(self, platform: impl Platform + 'static) -> Display {
        Display::with_config(platform, self.config)
    }
}
