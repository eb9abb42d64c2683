//! Meridian - the native-event bridge of a widget toolkit.
//!
//! A [`Display`] receives raw input and window-system notifications from a
//! [`Platform`] adapter, translates them into platform-independent widget
//! [`Event`]s and keeps the state that translation depends on: keyboard
//! focus, the control under the pointer, drag gestures, keyboard traversal
//! and per-control visible regions.
//!
//! # Example
//!
//! ```
//! use meridian::{ControlConfig, Display, EventType, HeadlessPlatform, WindowConfig};
//! use meridian::geometry::{Point, Rect};
//! use meridian::native::NativeMouseEvent;
//!
//! let platform = HeadlessPlatform::new();
//! let mut display = Display::new(platform.clone());
//!
//! let window = display.create_window(WindowConfig::new(Rect::new(100.0, 100.0, 400.0, 300.0)))?;
//! let button = display.create_control(window, ControlConfig::new(Rect::new(10.0, 10.0, 80.0, 24.0)))?;
//! display.add_listener(button, EventType::MouseEnter, |_, event| {
//!     println!("entered at {:?}", event.position);
//!     Ok(())
//! })?;
//!
//! platform.post(NativeMouseEvent::moved(window, Point::new(20.0, 20.0)));
//! while display.read_and_dispatch()? {}
//! assert_eq!(display.get_cursor_control()?, Some(button));
//! # Ok::<(), meridian::MeridianError>(())
//! ```

pub mod display;
pub mod event;
pub mod native;
pub mod platform;
pub mod widget;

/// Geometry types and the region algebra.
pub mod geometry {
    pub use meridian_geometry::*;
}

pub use display::{
    Display, DisplayBuilder, DisplayConfig, DisplayHandle, ErrorHandler, ExceptionHandler,
    classify,
};
pub use event::{Event, EventType, Key, KeyboardModifiers, MouseButton, TraversalAction};
pub use meridian_core::{MeridianError, Result, TimerError, TimerId};
pub use platform::{HeadlessPlatform, Platform};
pub use widget::{
    ControlConfig, ListenerError, ListenerId, ListenerResult, WidgetFlags, WidgetId, WindowConfig,
};
