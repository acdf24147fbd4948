use glam::{Mat3, Mat4, Vec3};

pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;
const PITCH_LIMIT: f32 = 89.0;
const ZOOM_MIN: f32 = 1.0;
const ZOOM_MAX: f32 = 45.0;
const WORLD_UP: Vec3 = Vec3::Y;

/// Fixed viewpoint over the driver's shoulder, relative to the scene
/// origin rather than the train so the scripted motion stays visible.
pub const DRIVER_SEAT: Vec3 = Vec3::new(21.6, 14.2, 4.5);

/// Movement requests fed from held keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Scripted viewpoints selectable with the number keys.
///
/// Only `Driver` repositions the camera. `Passenger`, `ThirdPerson` and
/// `FreeFly` are placeholders that apply no positioning, so the free
/// camera keeps drifting while they are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Driver,
    Passenger,
    ThirdPerson,
    FreeFly,
}

impl CameraMode {
    pub fn apply(self, camera: &mut Camera) {
        match self {
            CameraMode::Driver => camera.set_position(DRIVER_SEAT),
            CameraMode::Passenger | CameraMode::ThirdPerson | CameraMode::FreeFly => {}
        }
    }
}

/// First-person free-fly camera. Yaw and pitch are kept in degrees; the
/// orthonormal basis is derived from them on demand.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            zoom: DEFAULT_ZOOM,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }

    pub fn front(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(WORLD_UP).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.front()).normalize()
    }

    /// Moves along the current basis, scaled by speed and frame delta.
    pub fn process_keyboard(&mut self, direction: Direction, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            Direction::Forward => self.position += self.front() * velocity,
            Direction::Backward => self.position -= self.front() * velocity,
            Direction::Left => self.position -= self.right() * velocity,
            Direction::Right => self.position += self.right() * velocity,
            Direction::Up => self.position += self.up() * velocity,
            Direction::Down => self.position -= self.up() * velocity,
        }
    }

    /// Accumulates yaw/pitch from a raw cursor delta. Pitch is clamped
    /// short of the poles to keep the basis well defined.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Narrows or widens the field of view within [1, 45] degrees.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up())
    }

    /// Hard override used by the fixed camera modes. Orientation is left
    /// untouched.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

/// Drops the translation column of a view matrix, leaving rotation only.
/// Applied to the skybox view so it reads as infinitely distant.
pub fn strip_translation(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}
