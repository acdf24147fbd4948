use glam::{Vec3, Vec4};
use railview::path::START;
use railview::renderer::{SCENE_DEPTH_COMPARE, SKYBOX_DEPTH_COMPARE};
use railview::scene::{train_transform, ModelId, Scene};

#[test]
fn train_is_drawn_first_and_skybox_is_not_a_scene_object() {
    let scene = Scene::new();
    let draws = scene.draw_list();
    assert_eq!(draws[0].0, ModelId::Train);
    assert_eq!(draws.len(), ModelId::ALL.len());
}

#[test]
fn train_transform_tracks_the_path() {
    let mut scene = Scene::new();
    let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);

    let at_start = (train_transform(scene.train_position()) * origin).truncate();
    assert!((at_start - START).length() < 1e-4);

    for _ in 0..500 {
        scene.update();
    }
    let later = (train_transform(scene.train_position()) * origin).truncate();
    assert!(later.z < at_start.z);
}

#[test]
fn scale_applies_after_translation() {
    // translate * scale * rotate: a model-space point one unit out ends
    // up 4.3 units from the translated origin, not 4.3 times the
    // translation.
    let m = train_transform(Vec3::new(100.0, 0.0, 0.0));
    let tip = (m * Vec4::new(1.0, 0.0, 0.0, 1.0)).truncate();
    let origin = (m * Vec4::new(0.0, 0.0, 0.0, 1.0)).truncate();
    assert!(((tip - origin).length() - 4.3).abs() < 1e-3);
    assert!((origin - Vec3::new(100.0, 0.0, 0.0)).length() < 1e-4);
}

#[test]
fn depth_state_pairs_scene_less_with_skybox_lequal() {
    // Two pipelines stand in for the depth-function toggle: the skybox
    // draws under LessEqual and the scene under Less, unconditionally.
    assert_eq!(SCENE_DEPTH_COMPARE, wgpu::CompareFunction::Less);
    assert_eq!(SKYBOX_DEPTH_COMPARE, wgpu::CompareFunction::LessEqual);
}

#[test]
fn every_model_resolves_an_asset_path() {
    for id in ModelId::ALL {
        assert!(id.asset_path().ends_with(".gltf"));
    }
}
