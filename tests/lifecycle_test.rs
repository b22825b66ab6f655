use voxel_ngin::{
    flow::{Lifecycle, Phase, is_quit_request},
    input::KeyState,
};
use winit::{event::WindowEvent, keyboard::KeyCode};

#[test]
fn immediate_quit_after_init() {
    let mut lifecycle = Lifecycle::new();
    assert_eq!(lifecycle.phase(), Phase::Initializing);
    // nothing is drawn before setup finished
    assert!(!lifecycle.begin_frame());

    lifecycle.initialized();
    assert_eq!(lifecycle.phase(), Phase::Running);
    lifecycle.request_quit();

    assert_eq!(lifecycle.phase(), Phase::ShuttingDown);
    assert!(!lifecycle.begin_frame());
    assert_eq!(lifecycle.initializations(), 1);
    assert_eq!(lifecycle.frames(), 0);
    assert!(lifecycle.failure().is_none());
    assert!(lifecycle.into_result().is_ok());
}

#[test]
fn frames_are_counted_while_running() {
    let mut lifecycle = Lifecycle::default();
    lifecycle.initialized();
    for _ in 0..3 {
        assert!(lifecycle.begin_frame());
        lifecycle.frame_presented();
    }
    lifecycle.request_quit();
    lifecycle.request_quit();
    lifecycle.frame_presented();

    assert_eq!(lifecycle.frames(), 3);
    assert_eq!(lifecycle.phase(), Phase::ShuttingDown);
}

#[test]
fn dropped_frames_are_not_counted() {
    let mut lifecycle = Lifecycle::new();
    lifecycle.initialized();

    // the surface was lost: the frame began but never reached the screen
    assert!(lifecycle.begin_frame());
    assert_eq!(lifecycle.frames(), 0);

    assert!(lifecycle.begin_frame());
    lifecycle.frame_presented();
    assert_eq!(lifecycle.frames(), 1);
}

#[test]
fn closing_the_window_quits() {
    assert!(is_quit_request(&WindowEvent::CloseRequested));
    assert!(!is_quit_request(&WindowEvent::Focused(true)));
    assert!(!is_quit_request(&WindowEvent::RedrawRequested));
}

#[test]
fn initialization_happens_once() {
    let mut lifecycle = Lifecycle::new();
    lifecycle.initialized();
    lifecycle.initialized();
    lifecycle.request_quit();
    lifecycle.initialized();

    assert_eq!(lifecycle.initializations(), 1);
    assert_eq!(lifecycle.phase(), Phase::ShuttingDown);
}

#[test]
fn failed_setup_shuts_down_with_an_error() {
    let mut lifecycle = Lifecycle::new();
    lifecycle.fail("no suitable graphics adapter");

    assert_eq!(lifecycle.phase(), Phase::ShuttingDown);
    assert_eq!(lifecycle.initializations(), 0);
    assert_eq!(lifecycle.failure(), Some("no suitable graphics adapter"));
    let err = lifecycle.into_result().unwrap_err();
    assert_eq!(err.to_string(), "no suitable graphics adapter");
}

#[test]
fn focus_loss_releases_every_key() {
    let mut keys = KeyState::new();
    keys.press(KeyCode::KeyW);
    keys.press(KeyCode::ShiftLeft);
    assert_eq!(keys.axis(KeyCode::KeyW, KeyCode::KeyS), 1.0);

    assert!(!keys.handle_window_event(&WindowEvent::Focused(false)));

    assert!(!keys.is_held(KeyCode::KeyW));
    assert!(!keys.is_held(KeyCode::ShiftLeft));
    assert_eq!(keys.axis(KeyCode::Space, KeyCode::ShiftLeft), 0.0);
}
