//! Tests for the dispatch loop, timers and cross-thread work.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{Recorder, open_window, pump, setup};
use meridian::geometry::Rect;
use meridian::native::NativeKeyEvent;
use meridian::{
    ControlConfig, Display, Event, EventType, Key, KeyboardModifiers, MeridianError, TimerError,
};

fn spin_until(display: &mut Display, done: impl Fn() -> bool) {
    while !done() {
        if !display.read_and_dispatch().unwrap() {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

#[test]
fn test_layout_requests_coalesce() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let panel = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();
    let recorder = Recorder::new();
    recorder.watch(&mut display, panel, &[EventType::Layout]);

    display.request_layout(panel).unwrap();
    display.request_layout(panel).unwrap();
    pump(&mut display);

    assert_eq!(recorder.take(), vec![(EventType::Layout, panel)]);
}

#[test]
fn test_posted_events_are_fifo_and_skip_disposed() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let a = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    let b = display
        .create_control(window, ControlConfig::new(Rect::new(20.0, 0.0, 10.0, 10.0)))
        .unwrap();
    let recorder = Recorder::new();
    let watched = [EventType::Move, EventType::Resize, EventType::Layout];
    recorder.watch(&mut display, a, &watched);
    recorder.watch(&mut display, b, &watched);

    display.post_event(Event::new(EventType::Move, a)).unwrap();
    display.post_event(Event::new(EventType::Layout, b)).unwrap();
    display.post_event(Event::new(EventType::Resize, a)).unwrap();
    display.dispose_widget(b).unwrap();
    assert!(recorder.take().is_empty());
    pump(&mut display);

    assert_eq!(
        recorder.take(),
        vec![(EventType::Move, a), (EventType::Resize, a)]
    );
}

#[test]
fn test_timer_runs_once_and_can_be_cancelled() {
    let (mut display, _platform) = setup();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let timer = display
        .create_timer(move |_| counter.set(counter.get() + 1))
        .unwrap();

    display.timer_exec(0, timer).unwrap();
    assert!(display.is_timer_scheduled(timer));
    pump(&mut display);
    assert_eq!(fired.get(), 1);
    assert!(!display.is_timer_scheduled(timer));

    display.timer_exec(10_000, timer).unwrap();
    display.timer_exec(-1, timer).unwrap();
    assert!(!display.is_timer_scheduled(timer));

    display.destroy_timer(timer).unwrap();
    assert_eq!(
        display.timer_exec(0, timer),
        Err(MeridianError::Timer(TimerError::InvalidTimerId))
    );
}

#[test]
fn test_sleep_wakes_for_timer() {
    let (mut display, _platform) = setup();
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let timer = display.create_timer(move |_| flag.set(true)).unwrap();
    display.timer_exec(20, timer).unwrap();

    while !fired.get() {
        if !display.read_and_dispatch().unwrap() {
            display.sleep().unwrap();
        }
    }
}

#[test]
fn test_sync_exec_from_worker() {
    let (mut display, _platform) = setup();
    open_window(&mut display);
    let handle = display.handle();

    let worker = std::thread::spawn(move || {
        handle.sync_exec(|display: &mut Display| display.windows().map(|windows| windows.len()))
    });
    spin_until(&mut display, || worker.is_finished());

    assert_eq!(worker.join().unwrap(), Ok(Ok(1)));
}

#[test]
fn test_sync_exec_panic_is_relayed() {
    let (mut display, _platform) = setup();
    let handle = display.handle();

    let worker = std::thread::spawn(move || {
        handle.sync_exec::<_, ()>(|_| panic!("work exploded"))
    });
    spin_until(&mut display, || worker.is_finished());

    assert_eq!(
        worker.join().unwrap(),
        Err(MeridianError::FailedExec("work exploded".into()))
    );
}

#[test]
fn test_sync_exec_on_ui_thread() {
    let (mut display, _platform) = setup();

    assert_eq!(display.handle().sync_exec(|_| 1), Err(MeridianError::WouldBlock));
    assert_eq!(display.sync_exec(|display| display.is_disposed()), Ok(false));
}

#[test]
fn test_async_exec_from_worker() {
    let (mut display, platform) = setup();
    let handle = display.handle();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();

    std::thread::spawn(move || {
        handle
            .async_exec(move |_| flag.store(true, Ordering::SeqCst))
            .unwrap();
    })
    .join()
    .unwrap();
    assert!(platform.wake_count() >= 1);

    spin_until(&mut display, || ran.load(Ordering::SeqCst));
}

#[test]
fn test_native_events_run_before_async_work() {
    let (mut display, platform) = setup();
    let window = open_window(&mut display);
    pump(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, window, &[EventType::KeyDown]);
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();

    display
        .async_exec(move |_| flag.store(true, Ordering::SeqCst))
        .unwrap();
    platform.post(NativeKeyEvent::down(window, Key::Character('q'), KeyboardModifiers::NONE));

    assert!(display.read_and_dispatch().unwrap());
    assert_eq!(recorder.take(), vec![(EventType::KeyDown, window)]);
    assert!(!ran.load(Ordering::SeqCst));

    assert!(display.read_and_dispatch().unwrap());
    assert!(ran.load(Ordering::SeqCst));
    assert!(!display.read_and_dispatch().unwrap());
}

#[test]
fn test_sleep_returns_while_async_work_pending() {
    let (mut display, _platform) = setup();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    display
        .async_exec(move |_| flag.store(true, Ordering::SeqCst))
        .unwrap();

    assert!(display.sleep().unwrap());
    assert!(!ran.load(Ordering::SeqCst));
    pump(&mut display);
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn test_dispose_rejects_further_use() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, window, &[EventType::Dispose]);
    let handle = display.handle();

    display.dispose().unwrap();

    assert_eq!(recorder.take(), vec![(EventType::Dispose, window)]);
    assert!(display.is_disposed());
    assert!(handle.is_disposed());
    assert_eq!(display.read_and_dispatch(), Err(MeridianError::DeviceDisposed));
    assert_eq!(
        display.create_window(Default::default()),
        Err(MeridianError::DeviceDisposed)
    );
    assert_eq!(handle.async_exec(|_| {}), Err(MeridianError::DeviceDisposed));
}

#[test]
fn test_disposed_widget_rejects_calls() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let panel = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    let child = display
        .create_control(panel, ControlConfig::new(Rect::new(0.0, 0.0, 5.0, 5.0)))
        .unwrap();
    let recorder = Recorder::new();
    recorder.watch(&mut display, panel, &[EventType::Dispose]);
    recorder.watch(&mut display, child, &[EventType::Dispose]);

    display.dispose_widget(panel).unwrap();

    assert_eq!(
        recorder.take(),
        vec![(EventType::Dispose, panel), (EventType::Dispose, child)]
    );
    assert!(display.children(window).unwrap().is_empty());
    assert_eq!(display.bounds(child), Err(MeridianError::WidgetDisposed));
    assert!(matches!(
        display.add_listener(panel, EventType::Move, |_, _| Ok(())),
        Err(MeridianError::WidgetDisposed)
    ));
}

#[test]
fn test_listener_failures_reach_handlers() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let errors = Rc::new(RefCell::new(Vec::new()));
    let exceptions = Rc::new(RefCell::new(Vec::new()));
    {
        let errors = errors.clone();
        display
            .set_error_handler(move |message| errors.borrow_mut().push(message.to_string()))
            .unwrap();
        let exceptions = exceptions.clone();
        display
            .set_exception_handler(move |error| exceptions.borrow_mut().push(error.to_string()))
            .unwrap();
    }
    display
        .add_listener(window, EventType::Layout, |_, _| panic!("listener blew up"))
        .unwrap();
    display
        .add_listener(window, EventType::Layout, |_, _| Err("listener refused".into()))
        .unwrap();
    let reached = Rc::new(Cell::new(false));
    let flag = reached.clone();
    display
        .add_listener(window, EventType::Layout, move |_, _| {
            flag.set(true);
            Ok(())
        })
        .unwrap();

    display.request_layout(window).unwrap();
    pump(&mut display);

    assert_eq!(*errors.borrow(), vec!["listener blew up".to_string()]);
    assert_eq!(*exceptions.borrow(), vec!["listener refused".to_string()]);
    assert!(reached.get());
}

#[test]
fn test_listener_removed_mid_dispatch_is_skipped() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let reached = Rc::new(Cell::new(false));
    let later = Rc::new(Cell::new(None));

    let slot = later.clone();
    display
        .add_listener(window, EventType::Layout, move |display, event| {
            if let Some(id) = slot.get() {
                display.remove_listener(event.widget, id)?;
            }
            Ok(())
        })
        .unwrap();
    let flag = reached.clone();
    let id = display
        .add_listener(window, EventType::Layout, move |_, _| {
            flag.set(true);
            Ok(())
        })
        .unwrap();
    later.set(Some(id));

    display.request_layout(window).unwrap();
    pump(&mut display);

    assert!(!reached.get());
    assert!(display.hooks(window, EventType::Layout).unwrap());
}

#[test]
fn test_filters_run_before_listeners() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let order = Rc::new(RefCell::new(Vec::new()));
    let seen = order.clone();
    display
        .add_listener(window, EventType::Layout, move |_, _| {
            seen.borrow_mut().push("listener");
            Ok(())
        })
        .unwrap();
    let seen = order.clone();
    let filter = display
        .add_filter(EventType::Layout, move |_, _| {
            seen.borrow_mut().push("filter");
            Ok(())
        })
        .unwrap();
    assert!(display.filters(EventType::Layout));

    display.request_layout(window).unwrap();
    pump(&mut display);
    assert_eq!(*order.borrow(), vec!["filter", "listener"]);

    assert!(display.remove_filter(filter).unwrap());
    assert!(!display.filters(EventType::Layout));
}

#[test]
fn test_bounds_changes_send_move_and_resize() {
    let (mut display, _platform) = setup();
    let window = open_window(&mut display);
    let panel = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 50.0, 50.0)))
        .unwrap();
    let recorder = Recorder::new();
    recorder.watch(&mut display, panel, &[EventType::Move, EventType::Resize]);

    display.set_location(panel, meridian::geometry::Point::new(10.0, 10.0)).unwrap();
    display.set_size(panel, meridian::geometry::Size::new(60.0, 60.0)).unwrap();
    display.set_bounds(panel, Rect::new(10.0, 10.0, 60.0, 60.0)).unwrap();
    display.set_bounds(panel, Rect::new(0.0, 0.0, 20.0, 20.0)).unwrap();

    assert_eq!(
        recorder.take(),
        vec![
            (EventType::Move, panel),
            (EventType::Resize, panel),
            (EventType::Move, panel),
            (EventType::Resize, panel),
        ]
    );
    assert_eq!(display.bounds(panel).unwrap(), Rect::new(0.0, 0.0, 20.0, 20.0));
}

#[test]
fn test_native_geometry_and_close() {
    use meridian::geometry::{Point, Size};
    use meridian::native::NativeGeometryEvent;

    let (mut display, platform) = setup();
    let window = open_window(&mut display);
    let recorder = Recorder::new();
    recorder.watch(
        &mut display,
        window,
        &[EventType::Move, EventType::Resize, EventType::Close],
    );
    let veto = Rc::new(Cell::new(true));
    let vetoing = veto.clone();
    display
        .add_listener(window, EventType::Close, move |_, event| {
            event.doit = !vetoing.get();
            Ok(())
        })
        .unwrap();

    platform.post(NativeGeometryEvent::WindowMoved {
        window,
        origin: Point::new(0.0, 0.0),
    });
    platform.post(NativeGeometryEvent::WindowResized {
        window,
        size: Size::new(640.0, 480.0),
    });
    platform.post(NativeGeometryEvent::CloseRequested { window });
    pump(&mut display);

    assert_eq!(
        recorder.take(),
        vec![
            (EventType::Move, window),
            (EventType::Resize, window),
            (EventType::Close, window),
        ]
    );
    assert!(!display.is_widget_disposed(window));
    assert_eq!(display.bounds(window).unwrap(), Rect::new(0.0, 0.0, 640.0, 480.0));

    veto.set(false);
    platform.post(NativeGeometryEvent::CloseRequested { window });
    pump(&mut display);
    assert!(display.is_widget_disposed(window));
    assert!(display.windows().unwrap().is_empty());
}

#[test]
fn test_repaints_and_context_flushes_reach_platform() {
    let (mut display, platform) = setup();
    let window = open_window(&mut display);
    let canvas = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();
    let damage = Rect::new(5.0, 5.0, 10.0, 10.0);

    display.redraw(canvas, Some(damage)).unwrap();
    display.flush_context(canvas).unwrap();
    display.flush_context(canvas).unwrap();
    assert!(platform.take_needs_display().is_empty());
    pump(&mut display);

    assert_eq!(platform.take_needs_display(), vec![(canvas, Some(damage))]);
    assert_eq!(platform.take_flushed_contexts(), vec![canvas]);
}

#[test]
fn test_native_views_follow_widgets() {
    let (mut display, platform) = setup();
    let window = open_window(&mut display);
    let panel = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 50.0, 50.0)))
        .unwrap();
    assert!(platform.has_view(panel));

    display.set_bounds(panel, Rect::new(5.0, 5.0, 40.0, 40.0)).unwrap();
    assert_eq!(platform.frame_of(panel), Some(Rect::new(5.0, 5.0, 40.0, 40.0)));
    display.set_visible(panel, false).unwrap();
    assert!(!platform.is_view_visible(panel));
    assert!(!display.is_showing(panel).unwrap());

    display.dispose_widget(panel).unwrap();
    assert!(!platform.has_view(panel));
}
