mod gltf;

pub use self::gltf::{load_model, ImageData, ModelData, Primitive};
