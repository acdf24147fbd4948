use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::path::Path;

use crate::types::ModelVertex;

/// Decoded texture pixels ready for upload. `channels` is the channel
/// count of the source image, before any expansion the uploader does.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

/// One draw batch: geometry plus its material.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    pub texture: Option<ImageData>,
}

/// A loaded model: every primitive of every mesh, flattened with node
/// transforms applied.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub primitives: Vec<Primitive>,
}

/// Loads a glTF file into CPU-side mesh and material data.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    log::info!("loading model {:?}", path);

    let (document, buffers, images) =
        gltf::import(path).with_context(|| format!("failed to load glTF file {:?}", path))?;

    let mut model = ModelData::default();
    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &images, &Mat4::IDENTITY, &mut model)?;
        }
    }

    if model.primitives.is_empty() {
        anyhow::bail!("no geometry found in {:?}", path);
    }

    let vertex_count: usize = model.primitives.iter().map(|p| p.vertices.len()).sum();
    log::info!(
        "loaded {:?}: {} primitives, {} vertices",
        path,
        model.primitives.len(),
        vertex_count
    );
    Ok(model)
}

/// Recursively walks glTF nodes, baking node transforms into vertices.
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    parent_transform: &Mat4,
    model: &mut ModelData,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, images, &global_transform, model)?;
    }

    for child in node.children() {
        process_node(&child, buffers, images, &global_transform, model)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    transform: &Mat4,
    model: &mut ModelData,
) -> Result<()> {
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions = reader
            .read_positions()
            .context("mesh primitive has no positions")?;
        let positions: Vec<Vec3> = positions
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();
        if positions.is_empty() {
            continue;
        }

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| {
                    transform
                        .transform_vector3(Vec3::from_array(n))
                        .normalize_or_zero()
                })
                .collect(),
            None => vec![Vec3::Y; positions.len()],
        };

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let vertices: Vec<ModelVertex> = positions
            .iter()
            .zip(normals.iter())
            .zip(uvs.iter())
            .map(|((position, normal), uv)| ModelVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: *uv,
            })
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            // Unindexed triangle list.
            None => (0..vertices.len() as u32).collect(),
        };

        let material = primitive.material().pbr_metallic_roughness();
        let base_color = material.base_color_factor();
        let texture = material
            .base_color_texture()
            .map(|info| extract_image(&images[info.texture().source().index()]));

        model.primitives.push(Primitive {
            vertices,
            indices,
            base_color,
            texture,
        });
    }

    Ok(())
}

/// Converts a glTF image into raw pixels plus a channel count the
/// renderer's format policy understands.
fn extract_image(data: &gltf::image::Data) -> ImageData {
    use gltf::image::Format;

    let channels = match data.format {
        Format::R8 => 1,
        Format::R8G8B8 => 3,
        Format::R8G8B8A8 => 4,
        // Anything wider or packed differently is rejected downstream.
        _ => 0,
    };

    ImageData {
        width: data.width,
        height: data.height,
        channels,
        pixels: data.pixels.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let err = load_model("does/not/exist.gltf").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.gltf"));
    }
}
