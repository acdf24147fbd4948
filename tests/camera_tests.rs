use glam::Vec3;
use railview::camera::{strip_translation, Camera, CameraMode, Direction, DRIVER_SEAT};
use railview::input::{Button, InputState};

#[test]
fn pitch_clamped_regardless_of_input_magnitude() {
    let mut camera = Camera::new(Vec3::ZERO);
    camera.process_mouse_movement(0.0, 1.0e9);
    assert!(camera.pitch <= 89.0);
    camera.process_mouse_movement(0.0, -1.0e9);
    assert!(camera.pitch >= -89.0);
}

#[test]
fn zoom_clamped_regardless_of_scroll_magnitude() {
    let mut camera = Camera::new(Vec3::ZERO);
    camera.process_mouse_scroll(1.0e9);
    assert_eq!(camera.zoom, 1.0);
    camera.process_mouse_scroll(-1.0e9);
    assert_eq!(camera.zoom, 45.0);
}

#[test]
fn startup_causes_no_rotation_without_motion() {
    // No motion events have arrived; the cursor's absolute position at
    // startup must not leak into the orientation.
    let input = InputState::new();
    let mut camera = Camera::new(Vec3::ZERO);
    let (yaw, pitch) = (camera.yaw, camera.pitch);

    let (dx, dy) = input.mouse_delta();
    camera.process_mouse_movement(dx, -dy);

    assert_eq!(camera.yaw, yaw);
    assert_eq!(camera.pitch, pitch);
}

#[test]
fn look_follows_raw_motion_deltas() {
    // Raw device motion keeps reporting even when the grabbed cursor's
    // window position is pinned, so a pinned cursor still turns the
    // camera.
    let mut input = InputState::new();
    let mut camera = Camera::new(Vec3::ZERO);
    let (yaw, pitch) = (camera.yaw, camera.pitch);

    input.on_mouse_motion(10.0, -5.0);
    let (dx, dy) = input.mouse_delta();
    camera.process_mouse_movement(dx, -dy);

    assert!(camera.yaw > yaw);
    assert!(camera.pitch > pitch);
}

#[test]
fn simultaneous_mode_keys_resolve_to_highest() {
    let mut input = InputState::new();
    input.on_key(Button::Mode1, true);
    input.on_key(Button::Mode4, true);
    assert_eq!(input.selected_mode(), Some(CameraMode::FreeFly));
}

#[test]
fn mode_persists_when_no_key_is_down() {
    let input = InputState::new();
    let mut current = Some(CameraMode::Driver);
    if let Some(mode) = input.selected_mode() {
        current = Some(mode);
    }
    assert_eq!(current, Some(CameraMode::Driver));
}

#[test]
fn driver_mode_is_the_only_positioning_mode() {
    for (mode, moves) in [
        (CameraMode::Driver, true),
        (CameraMode::Passenger, false),
        (CameraMode::ThirdPerson, false),
        (CameraMode::FreeFly, false),
    ] {
        let mut camera = Camera::new(Vec3::new(5.0, 5.0, 5.0));
        mode.apply(&mut camera);
        if moves {
            assert_eq!(camera.position, DRIVER_SEAT);
        } else {
            assert_eq!(camera.position, Vec3::new(5.0, 5.0, 5.0));
        }
    }
}

#[test]
fn movement_respects_delta_time() {
    let mut slow = Camera::new(Vec3::ZERO);
    let mut fast = Camera::new(Vec3::ZERO);
    slow.process_keyboard(Direction::Forward, 0.01);
    fast.process_keyboard(Direction::Forward, 0.02);
    assert!((fast.position.length() - 2.0 * slow.position.length()).abs() < 1e-5);
}

#[test]
fn skybox_view_is_rotation_only() {
    let mut camera = Camera::new(Vec3::new(-265.0, 40.0, 190.0));
    camera.process_mouse_movement(250.0, -120.0);
    let stripped = strip_translation(camera.view_matrix());
    assert_eq!(stripped.w_axis, glam::Vec4::new(0.0, 0.0, 0.0, 1.0));
}
