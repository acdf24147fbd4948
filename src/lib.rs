pub mod camera;
pub mod cli;
pub mod frame;
pub mod input;
pub mod loaders;
pub mod path;
pub mod renderer;
pub mod scene;
pub mod types;

pub use camera::{Camera, CameraMode, Direction};
pub use input::{Button, InputState};
pub use path::advance;
pub use scene::{ModelId, Scene};
