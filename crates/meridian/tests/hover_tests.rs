//! Tests for enter/exit tracking, hover and cursors.

mod common;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use common::{Recorder, open_window, pump, setup};
use cursor_icon::CursorIcon;
use meridian::geometry::{Point, Rect};
use meridian::native::NativeMouseEvent;
use meridian::{ControlConfig, Display, EventType, HeadlessPlatform, WidgetId};

const CROSSING: &[EventType] = &[EventType::MouseEnter, EventType::MouseExit];

fn two_controls(display: &mut Display) -> (WidgetId, WidgetId, WidgetId) {
    let window = open_window(display);
    let a = display
        .create_control(window, ControlConfig::new(Rect::new(10.0, 10.0, 100.0, 100.0)))
        .unwrap();
    let b = display
        .create_control(window, ControlConfig::new(Rect::new(150.0, 10.0, 100.0, 100.0)))
        .unwrap();
    (window, a, b)
}

#[test]
fn test_single_enter_while_moving_within_control() {
    let (mut display, platform) = setup();
    let (window, a, _) = two_controls(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, a, CROSSING);

    platform.post(NativeMouseEvent::moved(window, Point::new(20.0, 20.0)));
    platform.post(NativeMouseEvent::moved(window, Point::new(30.0, 30.0)));
    platform.post(NativeMouseEvent::moved(window, Point::new(40.0, 35.0)));
    pump(&mut display);

    assert_eq!(recorder.take(), vec![(EventType::MouseEnter, a)]);
    assert_eq!(display.get_cursor_control().unwrap(), Some(a));
    assert_eq!(
        display.get_cursor_location().unwrap(),
        Some(Point::new(140.0, 135.0))
    );
}

#[test]
fn test_crossing_to_sibling_exits_then_enters() {
    let (mut display, platform) = setup();
    let (window, a, b) = two_controls(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, a, CROSSING);
    recorder.watch(&mut display, b, CROSSING);

    platform.post(NativeMouseEvent::moved(window, Point::new(20.0, 20.0)));
    platform.post(NativeMouseEvent::moved(window, Point::new(160.0, 20.0)));
    platform.post(NativeMouseEvent::exited(window));
    pump(&mut display);

    assert_eq!(
        recorder.take(),
        vec![
            (EventType::MouseEnter, a),
            (EventType::MouseExit, a),
            (EventType::MouseEnter, b),
            (EventType::MouseExit, b),
        ]
    );
    assert_eq!(display.get_cursor_control().unwrap(), None);
}

#[test]
fn test_enter_position_is_local() {
    let (mut display, platform) = setup();
    let (window, a, _) = two_controls(&mut display);
    let position = Rc::new(Cell::new(None));
    let seen = position.clone();
    display
        .add_listener(a, EventType::MouseEnter, move |_, event| {
            seen.set(Some(event.position));
            Ok(())
        })
        .unwrap();

    platform.post(NativeMouseEvent::moved(window, Point::new(25.0, 40.0)));
    pump(&mut display);

    assert_eq!(position.get(), Some(Point::new(15.0, 30.0)));
}

#[test]
fn test_hover_fires_after_delay() {
    common::init_tracing();
    let platform = HeadlessPlatform::new();
    let mut display = Display::builder()
        .hover_delay(Duration::from_millis(20))
        .build(platform.clone());
    let (window, a, _) = two_controls(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, a, &[EventType::MouseHover]);

    platform.post(NativeMouseEvent::moved(window, Point::new(20.0, 20.0)));
    pump(&mut display);
    std::thread::sleep(Duration::from_millis(40));
    pump(&mut display);

    assert_eq!(recorder.take(), vec![(EventType::MouseHover, a)]);
}

#[test]
fn test_cursor_follows_hovered_control() {
    let (mut display, platform) = setup();
    let window = open_window(&mut display);
    let link = display
        .create_control(
            window,
            ControlConfig::new(Rect::new(10.0, 10.0, 100.0, 20.0)).cursor(CursorIcon::Pointer),
        )
        .unwrap();
    let label = display
        .create_control(link, ControlConfig::new(Rect::new(0.0, 0.0, 50.0, 20.0)))
        .unwrap();

    platform.post(NativeMouseEvent::moved(window, Point::new(15.0, 15.0)));
    pump(&mut display);
    assert_eq!(display.get_cursor_control().unwrap(), Some(label));
    assert_eq!(display.effective_cursor(label).unwrap(), CursorIcon::Pointer);
    assert_eq!(platform.cursor(), CursorIcon::Pointer);

    display.set_cursor(link, Some(CursorIcon::Text)).unwrap();
    assert_eq!(platform.cursor(), CursorIcon::Text);

    platform.post(NativeMouseEvent::moved(window, Point::new(300.0, 200.0)));
    pump(&mut display);
    assert_eq!(display.get_cursor_control().unwrap(), Some(window));
    assert_eq!(platform.cursor(), CursorIcon::Default);
}

#[test]
fn test_disposing_hovered_control_clears_tracking() {
    let (mut display, platform) = setup();
    let (window, a, _) = two_controls(&mut display);

    platform.post(NativeMouseEvent::moved(window, Point::new(20.0, 20.0)));
    pump(&mut display);
    display.dispose_widget(a).unwrap();

    assert_eq!(display.get_cursor_control().unwrap(), None);
}
