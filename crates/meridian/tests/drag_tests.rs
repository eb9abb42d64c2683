//! Tests for drag-gesture detection.

mod common;

use std::time::Duration;

use common::{Recorder, open_window, pump, setup};
use meridian::geometry::{Point, Rect};
use meridian::native::{NativeEvent, NativeKeyEvent, NativeMouseEvent};
use meridian::{
    ControlConfig, Display, EventType, HeadlessPlatform, Key, KeyboardModifiers, MouseButton,
    WidgetId,
};

const GESTURE: &[EventType] = &[
    EventType::MouseDown,
    EventType::MouseMove,
    EventType::MouseUp,
    EventType::DragDetect,
];

fn draggable(display: &mut Display) -> (WidgetId, WidgetId) {
    let window = open_window(display);
    let handle = display
        .create_control(
            window,
            ControlConfig::new(Rect::new(10.0, 10.0, 100.0, 100.0)).drag_detect(true),
        )
        .unwrap();
    (window, handle)
}

#[test]
fn test_motion_beyond_hysteresis_is_a_drag() {
    let (mut display, platform) = setup();
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, GESTURE);

    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    platform.post(NativeMouseEvent::dragged(window, Point::new(30.0, 20.0), MouseButton::Left));
    platform.post(NativeMouseEvent::up(window, Point::new(30.0, 20.0), MouseButton::Left));
    pump(&mut display);

    assert_eq!(
        recorder.take(),
        vec![
            (EventType::MouseDown, handle),
            (EventType::DragDetect, handle),
            (EventType::MouseMove, handle),
            (EventType::MouseUp, handle),
        ]
    );
}

#[test]
fn test_detected_drag_leaves_queue_in_order() {
    let (mut display, platform) = setup();
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, GESTURE);

    let key: NativeEvent =
        NativeKeyEvent::down(window, Key::Character('x'), KeyboardModifiers::NONE).into();
    let dragged: NativeEvent =
        NativeMouseEvent::dragged(window, Point::new(30.0, 20.0), MouseButton::Left).into();
    let up: NativeEvent = NativeMouseEvent::up(window, Point::new(30.0, 20.0), MouseButton::Left).into();
    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    platform.post(key);
    platform.post(dragged);
    platform.post(up);

    assert!(display.read_and_dispatch().unwrap());
    assert_eq!(
        recorder.take(),
        vec![(EventType::MouseDown, handle), (EventType::DragDetect, handle)]
    );
    assert_eq!(platform.pending_events(), vec![key, dragged, up]);
}

#[test]
fn test_look_ahead_skips_other_events() {
    let (mut display, platform) = setup();
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, GESTURE);

    let key: NativeEvent =
        NativeKeyEvent::down(window, Key::Character('x'), KeyboardModifiers::NONE).into();
    let dragged: NativeEvent =
        NativeMouseEvent::dragged(window, Point::new(21.0, 22.0), MouseButton::Left).into();
    let up: NativeEvent = NativeMouseEvent::up(window, Point::new(21.0, 22.0), MouseButton::Left).into();
    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    platform.post(dragged);
    platform.post(key);
    platform.post(up);

    assert!(display.read_and_dispatch().unwrap());
    assert_eq!(recorder.take(), vec![(EventType::MouseDown, handle)]);
    assert_eq!(platform.pending_events(), vec![dragged, key, up]);
}

#[test]
fn test_small_motion_leaves_queue_intact() {
    let (mut display, platform) = setup();
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, GESTURE);

    let dragged: NativeEvent =
        NativeMouseEvent::dragged(window, Point::new(22.0, 21.0), MouseButton::Left).into();
    let up: NativeEvent = NativeMouseEvent::up(window, Point::new(22.0, 21.0), MouseButton::Left).into();
    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    platform.post(dragged);
    platform.post(up);

    assert!(display.read_and_dispatch().unwrap());
    assert_eq!(platform.pending_events(), vec![dragged, up]);

    pump(&mut display);
    assert_eq!(
        recorder.take(),
        vec![
            (EventType::MouseDown, handle),
            (EventType::MouseMove, handle),
            (EventType::MouseUp, handle),
        ]
    );
}

#[test]
fn test_held_press_times_out_into_drag() {
    common::init_tracing();
    let platform = HeadlessPlatform::new();
    let mut display = Display::builder()
        .drag_timeout(Duration::from_millis(20))
        .build(platform.clone());
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, &[EventType::DragDetect]);

    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    pump(&mut display);

    assert_eq!(recorder.take(), vec![(EventType::DragDetect, handle)]);
}

#[test]
fn test_consumed_drag_suppresses_motion() {
    let (mut display, platform) = setup();
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, GESTURE);
    display
        .add_listener(handle, EventType::DragDetect, |_, event| {
            event.doit = false;
            Ok(())
        })
        .unwrap();

    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    platform.post(NativeMouseEvent::dragged(window, Point::new(40.0, 40.0), MouseButton::Left));
    platform.post(NativeMouseEvent::dragged(window, Point::new(50.0, 50.0), MouseButton::Left));
    platform.post(NativeMouseEvent::up(window, Point::new(50.0, 50.0), MouseButton::Left));
    pump(&mut display);

    assert_eq!(
        recorder.take(),
        vec![
            (EventType::MouseDown, handle),
            (EventType::DragDetect, handle),
            (EventType::MouseUp, handle),
        ]
    );
}

#[test]
fn test_no_detection_without_listener() {
    let (mut display, platform) = setup();
    let (window, handle) = draggable(&mut display);
    let recorder = Recorder::new();
    recorder.watch(&mut display, handle, &[EventType::MouseDown]);

    platform.post(NativeMouseEvent::down(window, Point::new(20.0, 20.0), MouseButton::Left, 1));
    platform.post(NativeMouseEvent::dragged(window, Point::new(60.0, 60.0), MouseButton::Left));
    assert!(display.read_and_dispatch().unwrap());

    assert_eq!(recorder.take(), vec![(EventType::MouseDown, handle)]);
    assert_eq!(platform.pending_events().len(), 1);
}
