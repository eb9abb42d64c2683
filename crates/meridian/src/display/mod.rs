//! The display: owner of the widget tree, the trackers and the dispatch loop.
//!
//! A [`Display`] is created on the user-interface thread and never leaves it.
//! Every public method first checks that it is called on that thread and
//! that the display (and any widget argument) is still alive, and fails
//! without side effects otherwise. Other threads talk to the display through
//! a [`DisplayHandle`].
//!
//! Focus, hover and drag state are plain fields of the display rather than
//! globals, so several displays can coexist in one process.

mod config;
mod dispatch;
mod drag;
mod focus;
mod handle;
mod hover;
mod input;
mod mapper;
mod region;
mod traverse;
mod widgets;

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;

use meridian_core::{
    MeridianError, Result, Synchronizer, ThreadAffinity, TimerError, TimerId, TimerQueue,
    panic_message,
};
use meridian_geometry::Rect;
use slotmap::SlotMap;

use crate::event::{Event, EventType};
use crate::platform::Platform;
use crate::widget::{Listener, ListenerError, ListenerId, ListenerResult, ListenerTable, WidgetId, WidgetTree};

pub use config::{
    DEFAULT_DRAG_HYSTERESIS, DEFAULT_DRAG_TIMEOUT, DEFAULT_HOVER_DELAY, DEFAULT_MAX_FOCUS_PASSES,
    DisplayBuilder, DisplayConfig,
};
pub use handle::DisplayHandle;
pub use traverse::classify;

use drag::DragState;
use focus::FocusState;
use hover::HoverState;

/// Handler for errors returned by listeners.
pub type ExceptionHandler = Rc<dyn Fn(&ListenerError)>;

/// Handler for panics raised by listeners, timers and async work.
pub type ErrorHandler = Rc<dyn Fn(&str)>;

/// Callback run when an application timer fires.
type TimerCallback = Rc<dyn Fn(&mut Display)>;

/// Identities sharing the display's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TimerKey {
    Hover,
    User(TimerId),
}

/// The root of a widget toolkit instance.
pub struct Display {
    affinity: ThreadAffinity,
    config: DisplayConfig,
    platform: Box<dyn Platform>,
    tree: WidgetTree,
    filters: ListenerTable,
    next_listener_id: u64,
    synchronizer: Arc<Synchronizer<Display>>,
    timers: TimerQueue<TimerKey>,
    timer_callbacks: SlotMap<TimerId, TimerCallback>,
    pending_events: VecDeque<Event>,
    pending_layouts: Vec<WidgetId>,
    pending_repaints: Vec<(WidgetId, Option<Rect>)>,
    pending_contexts: Vec<WidgetId>,
    focus: FocusState,
    hover: HoverState,
    drag: DragState,
    active_window: Option<WidgetId>,
    exception_handler: ExceptionHandler,
    error_handler: ErrorHandler,
    disposed: bool,
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("windows", &self.tree.windows())
            .field("focus", &self.focus.control)
            .field("hovered", &self.hover.current)
            .field("active_window", &self.active_window)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Display {
    /// Create a display with default configuration, owned by the calling thread.
    pub fn new(platform: impl Platform + 'static) -> Self {
        Self::with_config(platform, DisplayConfig::default())
    }

    /// Create a display with custom configuration.
    pub fn with_config(platform: impl Platform + 'static, config: DisplayConfig) -> Self {
        let waker = platform.waker();
        tracing::debug!(target: "meridian::display", ?config, "display created");
        Self {
            affinity: ThreadAffinity::current(),
            config,
            platform: Box::new(platform),
            tree: WidgetTree::default(),
            filters: ListenerTable::default(),
            next_listener_id: 0,
            synchronizer: Arc::new(Synchronizer::new(waker)),
            timers: TimerQueue::new(),
            timer_callbacks: SlotMap::with_key(),
            pending_events: VecDeque::new(),
            pending_layouts: Vec::new(),
            pending_repaints: Vec::new(),
            pending_contexts: Vec::new(),
            focus: FocusState::default(),
            hover: HoverState::default(),
            drag: DragState::default(),
            active_window: None,
            exception_handler: Rc::new(|error: &ListenerError| {
                tracing::error!(target: "meridian::listener", %error, "listener returned an error");
            }),
            error_handler: Rc::new(|message: &str| {
                tracing::error!(target: "meridian::listener", %message, "listener panicked");
            }),
            disposed: false,
        }
    }

    /// Start configuring a display.
    pub fn builder() -> DisplayBuilder {
        DisplayBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// A handle other threads can use to reach this display.
    pub fn handle(&self) -> DisplayHandle {
        DisplayHandle {
            synchronizer: self.synchronizer.clone(),
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn check_device(&self) -> Result<()> {
        self.affinity.check()?;
        if self.disposed {
            return Err(MeridianError::DeviceDisposed);
        }
        Ok(())
    }

    pub(crate) fn check_widget(&self, widget: WidgetId) -> Result<()> {
        self.check_device()?;
        if !self.tree.contains(widget) {
            return Err(MeridianError::WidgetDisposed);
        }
        Ok(())
    }

    /// Whether `widget` has been disposed (or never belonged to this display).
    pub fn is_widget_disposed(&self, widget: WidgetId) -> bool {
        !self.tree.contains(widget)
    }

    pub(crate) fn alive(&self, widget: Option<WidgetId>) -> Option<WidgetId> {
        widget.filter(|widget| self.tree.contains(*widget))
    }

    /// Dispose every window, drop queued work and refuse further calls.
    ///
    /// Threads blocked in `sync_exec` are released with `DeviceDisposed`.
    pub fn dispose(&mut self) -> Result<()> {
        self.check_device()?;
        for window in self.tree.windows().to_vec().into_iter().rev() {
            self.release_widget(window);
        }
        self.synchronizer.dispose();
        self.timers.clear();
        self.timer_callbacks.clear();
        self.pending_events.clear();
        self.pending_layouts.clear();
        self.pending_repaints.clear();
        self.pending_contexts.clear();
        self.disposed = true;
        tracing::debug!(target: "meridian::display", "display disposed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------------

    fn next_listener_id(&mut self) -> ListenerId {
        self.next_listener_id += 1;
        ListenerId(self.next_listener_id)
    }

    /// Register `listener` for `event_type` on `widget`.
    pub fn add_listener<F>(
        &mut self,
        widget: WidgetId,
        event_type: EventType,
        listener: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&mut Display, &mut Event) -> ListenerResult + 'static,
    {
        self.check_widget(widget)?;
        let id = self.next_listener_id();
        let listener: Listener = Rc::new(listener);
        if let Some(node) = self.tree.get_mut(widget) {
            node.listeners.add(id, event_type, listener);
        }
        Ok(id)
    }

    /// Remove a listener. Returns `false` if it was not registered on `widget`.
    pub fn remove_listener(&mut self, widget: WidgetId, id: ListenerId) -> Result<bool> {
        self.check_widget(widget)?;
        Ok(self
            .tree
            .get_mut(widget)
            .is_some_and(|node| node.listeners.remove(id)))
    }

    /// Register a display-wide filter, run before widget listeners for every
    /// event of `event_type`.
    pub fn add_filter<F>(&mut self, event_type: EventType, filter: F) -> Result<ListenerId>
    where
        F: Fn(&mut Display, &mut Event) -> ListenerResult + 'static,
    {
        self.check_device()?;
        let id = self.next_listener_id();
        self.filters.add(id, event_type, Rc::new(filter));
        Ok(id)
    }

    /// Remove a filter.
    pub fn remove_filter(&mut self, id: ListenerId) -> Result<bool> {
        self.check_device()?;
        Ok(self.filters.remove(id))
    }

    /// Whether `widget` has a listener for `event_type`.
    pub fn hooks(&self, widget: WidgetId, event_type: EventType) -> Result<bool> {
        self.check_widget(widget)?;
        Ok(self.hooks_unchecked(widget, event_type))
    }

    pub(crate) fn hooks_unchecked(&self, widget: WidgetId, event_type: EventType) -> bool {
        self.tree
            .get(widget)
            .is_some_and(|node| node.listeners.hooks(event_type))
    }

    /// Whether a display filter exists for `event_type`.
    pub fn filters(&self, event_type: EventType) -> bool {
        self.filters.hooks(event_type)
    }

    /// Deliver `event` to `widget` now: filters first, then its listeners.
    pub fn notify_listeners(&mut self, widget: WidgetId, event: &mut Event) -> Result<()> {
        self.check_widget(widget)?;
        event.widget = widget;
        self.send_event(widget, event);
        Ok(())
    }

    /// Queue `event` for delivery after the current native event is handled.
    ///
    /// The event is delivered to `event.widget`, or dropped if that widget is
    /// disposed in the meantime.
    pub fn post_event(&mut self, event: Event) -> Result<()> {
        self.check_widget(event.widget)?;
        self.pending_events.push_back(event);
        Ok(())
    }

    pub(crate) fn send_event(&mut self, widget: WidgetId, event: &mut Event) {
        self.run_filters(event);
        self.invoke_listeners(widget, event);
    }

    pub(crate) fn run_filters(&mut self, event: &mut Event) {
        if !self.filters.hooks(event.event_type) {
            return;
        }
        for (id, filter) in self.filters.snapshot(event.event_type) {
            if self.filters.contains(id) {
                self.invoke(&filter, event);
            }
        }
    }

    /// Run the listeners `widget` has for the event, without filters.
    pub(crate) fn invoke_listeners(&mut self, widget: WidgetId, event: &mut Event) {
        let Some(node) = self.tree.get(widget) else {
            return;
        };
        for (id, listener) in node.listeners.snapshot(event.event_type) {
            match self.tree.get(widget) {
                Some(node) if node.listeners.contains(id) => self.invoke(&listener, event),
                Some(_) => continue,
                None => break,
            }
        }
    }

    fn invoke(&mut self, listener: &Listener, event: &mut Event) {
        match catch_unwind(AssertUnwindSafe(|| listener(self, event))) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => self.report_exception(error),
            Err(payload) => self.report_error(&panic_message(payload.as_ref())),
        }
    }

    /// Run `work`, routing a panic to the error handler.
    pub(crate) fn run_guarded(&mut self, work: impl FnOnce(&mut Display)) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| work(self))) {
            self.report_error(&panic_message(payload.as_ref()));
        }
    }

    fn report_exception(&mut self, error: ListenerError) {
        let handler = self.exception_handler.clone();
        handler(&error);
    }

    pub(crate) fn report_error(&mut self, message: &str) {
        let handler = self.error_handler.clone();
        handler(message);
    }

    /// Replace the handler for errors returned by listeners.
    pub fn set_exception_handler<F>(&mut self, handler: F) -> Result<()>
    where
        F: Fn(&ListenerError) + 'static,
    {
        self.check_device()?;
        self.exception_handler = Rc::new(handler);
        Ok(())
    }

    /// Replace the handler for panics raised by listeners, timers and async work.
    pub fn set_error_handler<F>(&mut self, handler: F) -> Result<()>
    where
        F: Fn(&str) + 'static,
    {
        self.check_device()?;
        self.error_handler = Rc::new(handler);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    /// Register a timer callback. Schedule it with [`timer_exec`](Self::timer_exec).
    pub fn create_timer<F>(&mut self, callback: F) -> Result<TimerId>
    where
        F: Fn(&mut Display) + 'static,
    {
        self.check_device()?;
        Ok(self.timer_callbacks.insert(Rc::new(callback)))
    }

    /// Run `timer` once after `millis` milliseconds.
    ///
    /// Scheduling a pending timer replaces its deadline; a negative delay
    /// cancels it.
    pub fn timer_exec(&mut self, millis: i64, timer: TimerId) -> Result<()> {
        self.check_device()?;
        if !self.timer_callbacks.contains_key(timer) {
            return Err(TimerError::InvalidTimerId.into());
        }
        self.timers
            .schedule_millis(TimerKey::User(timer), millis, std::time::Instant::now());
        Ok(())
    }

    /// Whether `timer` is scheduled.
    pub fn is_timer_scheduled(&self, timer: TimerId) -> bool {
        self.timers.is_scheduled(TimerKey::User(timer))
    }

    /// Cancel and forget a timer.
    pub fn destroy_timer(&mut self, timer: TimerId) -> Result<()> {
        self.check_device()?;
        if self.timer_callbacks.remove(timer).is_none() {
            return Err(TimerError::InvalidTimerId.into());
        }
        self.timers.cancel(TimerKey::User(timer));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cross-thread work
    // -------------------------------------------------------------------------

    /// Queue `work` to run on a later loop iteration.
    pub fn async_exec<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce(&mut Display) + Send + 'static,
    {
        self.check_device()?;
        self.synchronizer.async_exec(work)
    }

    /// Run `work` now. On the display's own thread there is nothing to wait for.
    pub fn sync_exec<F, R>(&mut self, work: F) -> Result<R>
    where
        F: FnOnce(&mut Display) -> R,
    {
        self.check_device()?;
        Ok(work(self))
    }

    /// Interrupt a blocked [`sleep`](Self::sleep).
    pub fn wake(&self) -> Result<()> {
        self.check_device()?;
        self.synchronizer.wake();
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        self.synchronizer.dispose();
    }
}
