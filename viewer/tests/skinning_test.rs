//! Skeleton preparation and matrix palette computation.

mod common;

use arte_core::gltf::{ErrorKind, Gltf, Index, Skin};
use arte_core::math::{Mat4, Vec3};
use arte_graphics::{BufferUsage, DummyBackend};
use arte_viewer::scene::{self, Scene};
use arte_viewer::skeleton::{Joint, JointRepository, PALETTE_BLOCK_BINDING};
use arte_viewer::{Skeleton, ViewerError, ViewerOptions, MAX_JOINTS};
use serde_json::json;

use common::{parse, skinned_document, translation_columns, Fixture};

fn skeleton(backend: &DummyBackend, gltf: &Gltf) -> Result<Skeleton, ViewerError> {
    Skeleton::prepare(backend, gltf.get(Index::<Skin>::new(0))?)
}

fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_translation(&Vec3::new(x, y, z))
}

#[test]
fn test_inverse_bind_matrices_loaded() {
    let backend = DummyBackend::new();
    let skeleton = skeleton(&backend, &parse(&skinned_document())).unwrap();

    assert_eq!(skeleton.joints, vec![Index::new(1), Index::new(2)]);
    assert_eq!(
        skeleton.inverse_bind_matrices,
        vec![translation(-1.0, 0.0, 0.0), translation(0.0, -1.0, 0.0)]
    );
    assert_eq!(skeleton.palette.matrix_count, 2);
    let palette = backend.buffer(skeleton.palette.buffer).unwrap();
    assert_eq!(palette.descriptor.size, 128);
    assert!(palette.descriptor.usage.contains(BufferUsage::UNIFORM));
}

#[test]
fn test_palette_is_world_times_inverse_bind() {
    let backend = DummyBackend::new();
    let skeleton = skeleton(&backend, &parse(&skinned_document())).unwrap();

    let mut joints = JointRepository::new();
    joints.insert(Index::new(1), Joint { world_transform: translation(1.0, 0.0, 0.0) });
    joints.insert(Index::new(2), Joint { world_transform: translation(1.0, 2.0, 0.0) });

    let palette = skeleton.compute_palette(&joints).unwrap();
    assert_eq!(palette, vec![Mat4::identity(), translation(1.0, 1.0, 0.0)]);

    skeleton.update_palette(&backend, &joints).unwrap();
    let data = backend.buffer_data(skeleton.palette.buffer).unwrap();
    let floats: &[f32] = bytemuck::cast_slice(&data);
    assert_eq!(floats.len(), 32);
    assert_eq!(&floats[..16], &translation_columns(0.0, 0.0, 0.0));
    assert_eq!(&floats[16..], &translation_columns(1.0, 1.0, 0.0));
}

#[test]
fn test_missing_joint_transform() {
    let backend = DummyBackend::new();
    let skeleton = skeleton(&backend, &parse(&skinned_document())).unwrap();

    let mut joints = JointRepository::new();
    joints.insert(Index::new(1), Joint { world_transform: Mat4::identity() });
    let err = skeleton.compute_palette(&joints).unwrap_err();
    assert!(matches!(err, ViewerError::MissingJointTransform(2)), "{err}");
}

#[test]
fn test_identity_without_inverse_bind_matrices() {
    let gltf = parse(&json!({
        "nodes": [{}, {}],
        "skins": [{ "joints": [0, 1] }]
    }));
    let skeleton = skeleton(&DummyBackend::new(), &gltf).unwrap();
    assert_eq!(skeleton.inverse_bind_matrices, vec![Mat4::identity(); 2]);
}

#[test]
fn test_too_many_joints() {
    let joint_count = MAX_JOINTS + 1;
    let gltf = parse(&json!({
        "nodes": vec![json!({}); joint_count],
        "skins": [{ "joints": (0..joint_count).collect::<Vec<_>>() }]
    }));
    let err = skeleton(&DummyBackend::new(), &gltf).unwrap_err();
    assert!(
        matches!(err, ViewerError::TooManyJoints { skin: 0, joints: 65, limit: 64 }),
        "{err}"
    );
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_inverse_bind_matrices_type_checked() {
    let mut fixture = Fixture::new();
    let vectors = fixture.floats(&[[0.0f32; 4]; 2], "VEC4");
    let gltf = parse(&fixture.finish(json!({
        "nodes": [{}, {}],
        "skins": [{ "inverseBindMatrices": vectors, "joints": [0, 1] }]
    })));
    let err = skeleton(&DummyBackend::new(), &gltf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_too_few_inverse_bind_matrices() {
    let mut fixture = Fixture::new();
    let matrices = fixture.floats(&[translation_columns(0.0, 0.0, 0.0)], "MAT4");
    let gltf = parse(&fixture.finish(json!({
        "nodes": [{}, {}],
        "skins": [{ "inverseBindMatrices": matrices, "joints": [0, 1] }]
    })));
    let err = skeleton(&DummyBackend::new(), &gltf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_skinned_scene_draw() {
    let backend = DummyBackend::new();
    let gltf = parse(&skinned_document());
    let index = scene::select_scene(&gltf, None).unwrap();
    let mut scene = Scene::new(&backend, gltf, index, &ViewerOptions::default()).unwrap();
    assert_eq!(scene.skeletons().len(), 1);
    assert!(scene.active_animation().is_none());

    scene.update(&backend, 0.0).unwrap();
    assert_eq!(
        scene.joints().get(&Index::new(2)).unwrap().world_transform,
        translation(1.0, 2.0, 0.0)
    );
    let entry = scene.meshes().values().next().unwrap();
    assert!(entry.instances.is_empty());
    assert_eq!(entry.skin_instances, vec![Index::new(0)]);

    let draws = scene.render(&backend, &arte_viewer::Renderer::new()).unwrap();
    assert_eq!(draws, 1);
    let recorded = backend.take_draws();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].instance_count, 1);
    assert_eq!(recorded[0].uniforms.len(), 1);
    assert_eq!(recorded[0].uniforms[0].binding, PALETTE_BLOCK_BINDING);

    let skeleton = scene.skeletons().values().next().unwrap();
    assert_eq!(recorded[0].uniforms[0].buffer, skeleton.palette.buffer);
    let data = backend.buffer_data(skeleton.palette.buffer).unwrap();
    let floats: &[f32] = bytemuck::cast_slice(&data);
    assert_eq!(&floats[16..], &translation_columns(1.0, 1.0, 0.0));
}
