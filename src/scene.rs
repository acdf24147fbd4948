use glam::{Mat4, Vec3};

use crate::path;

/// Every drawable in the scene, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelId {
    Train,
    Terrain,
    Station,
    SecondStation,
    BrasovSign,
    BucharestSign,
}

impl ModelId {
    /// Asset path relative to the asset root. The two stations share a
    /// model, as do the two signs; each still gets its own GPU instance.
    pub fn asset_path(self) -> &'static str {
        match self {
            ModelId::Train => "train/train.gltf",
            ModelId::Terrain => "terrain/terrain.gltf",
            ModelId::Station | ModelId::SecondStation => "station/station.gltf",
            ModelId::BrasovSign | ModelId::BucharestSign => "station/sign.gltf",
        }
    }

    pub const ALL: [ModelId; 6] = [
        ModelId::Train,
        ModelId::Terrain,
        ModelId::Station,
        ModelId::SecondStation,
        ModelId::BrasovSign,
        ModelId::BucharestSign,
    ];
}

/// Composes a placement in the fixed translate, then scale, then rotate
/// order. The composition order is load-bearing for the hand-tuned
/// placements; do not reorder.
fn place(translation: Vec3, scale: f32, rotation_y_degrees: f32) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_scale(Vec3::splat(scale))
        * Mat4::from_rotation_y(rotation_y_degrees.to_radians())
}

/// The train's placement for a given path position.
pub fn train_transform(position: Vec3) -> Mat4 {
    place(position, 4.3, 90.0)
}

pub fn terrain_transform() -> Mat4 {
    place(Vec3::new(650.0, -38.0, -750.0), 2500.0, 0.0)
}

pub fn station_transform() -> Mat4 {
    place(Vec3::new(-320.0, -17.0, 180.0), 0.03, 90.0)
}

pub fn second_station_transform() -> Mat4 {
    place(Vec3::new(-90.0, 22.0, -1860.0), 0.03, 10.0)
}

pub fn brasov_sign_transform() -> Mat4 {
    place(Vec3::new(-291.0, 55.0, 180.0), 7.0, 90.0)
}

pub fn bucharest_sign_transform() -> Mat4 {
    place(Vec3::new(-85.0, 93.5, -1831.0), 7.0, 10.0)
}

/// The fixed hand-authored layout plus the one moving object. Owns the
/// train position and advances it once per frame.
pub struct Scene {
    train_position: Vec3,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            train_position: path::START,
        }
    }

    pub fn train_position(&self) -> Vec3 {
        self.train_position
    }

    /// Advances the train along the scripted route by one frame.
    pub fn update(&mut self) {
        self.train_position = path::advance(self.train_position);
    }

    /// Per-frame model matrices in the order they are drawn.
    pub fn draw_list(&self) -> [(ModelId, Mat4); 6] {
        [
            (ModelId::Train, train_transform(self.train_position)),
            (ModelId::Terrain, terrain_transform()),
            (ModelId::Station, station_transform()),
            (ModelId::SecondStation, second_station_transform()),
            (ModelId::BrasovSign, brasov_sign_transform()),
            (ModelId::BucharestSign, bucharest_sign_transform()),
        ]
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
