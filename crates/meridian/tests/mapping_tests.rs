//! Tests for coordinate mapping and hit-testing.

mod common;

use common::setup;
use meridian::geometry::{Insets, Point, Rect};
use meridian::{ControlConfig, MeridianError, WindowConfig};

#[test]
fn test_map_point_through_screen_and_flip() {
    let (mut display, _platform) = setup();
    let window = display
        .create_window(WindowConfig::new(Rect::new(100.0, 50.0, 400.0, 300.0)))
        .unwrap();
    let panel = display
        .create_control(window, ControlConfig::new(Rect::new(10.0, 20.0, 200.0, 100.0)))
        .unwrap();
    let canvas = display
        .create_control(
            window,
            ControlConfig::new(Rect::new(250.0, 100.0, 100.0, 60.0)).flipped(false),
        )
        .unwrap();

    let point = Point::new(5.0, 5.0);
    assert_eq!(
        display.map_point(Some(panel), None, point).unwrap(),
        Point::new(115.0, 75.0)
    );
    assert_eq!(
        display.map_point(None, Some(panel), Point::new(115.0, 75.0)).unwrap(),
        point
    );

    let mapped = display.map_point(Some(panel), Some(canvas), point).unwrap();
    assert_eq!(mapped, Point::new(-235.0, 135.0));
    assert_eq!(display.map_point(Some(canvas), Some(panel), mapped).unwrap(), point);
}

#[test]
fn test_map_point_between_windows() {
    let (mut display, _platform) = setup();
    let left = display
        .create_window(WindowConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();
    let right = display
        .create_window(WindowConfig::new(Rect::new(300.0, 0.0, 100.0, 100.0)))
        .unwrap();

    assert_eq!(
        display
            .map_point(Some(left), Some(right), Point::new(10.0, 10.0))
            .unwrap(),
        Point::new(-290.0, 10.0)
    );
}

#[test]
fn test_map_rect_normalizes_across_flip() {
    let (mut display, _platform) = setup();
    let window = display
        .create_window(WindowConfig::new(Rect::new(100.0, 50.0, 400.0, 300.0)))
        .unwrap();
    let panel = display
        .create_control(window, ControlConfig::new(Rect::new(10.0, 20.0, 200.0, 100.0)))
        .unwrap();
    let canvas = display
        .create_control(
            window,
            ControlConfig::new(Rect::new(250.0, 100.0, 100.0, 60.0)).flipped(false),
        )
        .unwrap();

    let rect = display
        .map_rect(Some(panel), Some(canvas), Rect::new(0.0, 0.0, 10.0, 10.0))
        .unwrap();
    assert_eq!(rect, Rect::new(-240.0, 130.0, 10.0, 10.0));
}

#[test]
fn test_map_with_disposed_widget_fails() {
    let (mut display, _platform) = setup();
    let window = display.create_window(WindowConfig::default()).unwrap();
    let control = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    display.dispose_widget(control).unwrap();

    assert!(matches!(
        display.map_point(Some(control), None, Point::ZERO),
        Err(MeridianError::InvalidArgument(_))
    ));
}

#[test]
fn test_find_control_honors_trim() {
    let (mut display, _platform) = setup();
    let window = display
        .create_window(WindowConfig::new(Rect::new(100.0, 50.0, 400.0, 300.0)))
        .unwrap();
    let panel = display
        .create_control(
            window,
            ControlConfig::new(Rect::new(10.0, 20.0, 200.0, 100.0)).trim(Insets::uniform(5.0)),
        )
        .unwrap();

    assert_eq!(
        display.find_control(window, Point::new(50.0, 50.0), true).unwrap(),
        Some(panel)
    );
    assert_eq!(
        display.find_control(window, Point::new(12.0, 22.0), false).unwrap(),
        Some(panel)
    );
    assert_eq!(
        display.find_control(window, Point::new(12.0, 22.0), true).unwrap(),
        None
    );
    assert_eq!(
        display.find_control(window, Point::new(300.0, 250.0), true).unwrap(),
        Some(window)
    );
    assert!(display.find_control(panel, Point::ZERO, false).is_err());
}

#[test]
fn test_hidden_control_is_not_hit() {
    let (mut display, _platform) = setup();
    let window = display.create_window(WindowConfig::default()).unwrap();
    let bottom = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();
    let top = display
        .create_control(window, ControlConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();

    assert_eq!(
        display.find_control(window, Point::new(50.0, 50.0), false).unwrap(),
        Some(top)
    );
    display.set_visible(top, false).unwrap();
    assert_eq!(
        display.find_control(window, Point::new(50.0, 50.0), false).unwrap(),
        Some(bottom)
    );
}
