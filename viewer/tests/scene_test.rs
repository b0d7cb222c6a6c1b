//! Scene traversal, bounds, instancing and full runs.

mod common;

use arte_core::gltf::{ErrorKind, Index};
use arte_core::math::Vec3;
use arte_graphics::DummyBackend;
use arte_viewer::scene::{self, Scene};
use arte_viewer::{run, Mode, Renderer, ViewerOptions};
use serde_json::{json, Value};

use common::{animated_document, parse, skinned_document, triangle_document, Fixture};

/// The fixture triangle shown by a parent at (10, 0, 0) scaled by 2, and by
/// its child translated by (0, 5, 0) in the parent frame.
fn hierarchy_document() -> Value {
    let mut fixture = Fixture::new();
    let positions = fixture.positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    fixture.finish(json!({
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "mesh": 0, "children": [1], "translation": [10.0, 0.0, 0.0], "scale": [2.0, 2.0, 2.0] },
            { "mesh": 0, "translation": [0.0, 5.0, 0.0] }
        ],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": positions } }] }]
    }))
}

fn build(document: &Value, options: &ViewerOptions) -> (DummyBackend, Scene) {
    let backend = DummyBackend::new();
    let gltf = parse(document);
    let index = scene::select_scene(&gltf, options.scene).unwrap();
    let scene = Scene::new(&backend, gltf, index, options).unwrap();
    (backend, scene)
}

#[test]
fn test_world_transforms_propagate() {
    let (backend, mut scene) = build(&hierarchy_document(), &ViewerOptions::default());
    scene.update(&backend, 0.0).unwrap();

    let entry = scene.meshes().values().next().unwrap();
    let origins: Vec<[f32; 3]> = entry
        .instances
        .iter()
        .map(|instance| {
            let c = instance.model_transform[3];
            [c[0], c[1], c[2]]
        })
        .collect();
    // Parent first, then the child at 10 + 2 * (0, 5, 0).
    assert_eq!(origins, vec![[10.0, 0.0, 0.0], [10.0, 10.0, 0.0]]);
    assert_eq!(entry.instances[1].model_transform[0][0], 2.0);
}

#[test]
fn test_instanced_draw() {
    let (backend, mut scene) = build(&hierarchy_document(), &ViewerOptions::default());
    scene.update(&backend, 0.0).unwrap();

    // One mesh shown twice is one instanced draw.
    assert_eq!(scene.render(&backend, &Renderer::new()).unwrap(), 1);
    let draws = backend.take_draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].instance_count, 2);

    // The instance buffer is rewritten wholesale every frame.
    let instances = scene.meshes().values().next().unwrap().mesh.instances.buffer();
    let uploads = backend.buffer_uploads(instances);
    scene.update(&backend, 1.0 / 60.0).unwrap();
    assert_eq!(backend.buffer_uploads(instances), uploads + 1);
    assert_eq!(backend.buffer_data(instances).unwrap().len(), 2 * 64);
}

#[test]
fn test_scene_bounding_box() {
    let (_, scene) = build(&hierarchy_document(), &ViewerOptions::default());
    let bounds = scene.bounding_box();
    assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(bounds.max, Vec3::new(12.0, 12.0, 0.0));
    assert_eq!(bounds.center(), Vec3::new(11.0, 6.0, 0.0));
}

#[test]
fn test_scene_without_geometry() {
    let document = Fixture::new().finish(json!({
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "empty" }]
    }));
    let gltf = parse(&document);
    let err = Scene::new(&DummyBackend::new(), gltf, Index::new(0), &ViewerOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.to_string().contains("bounded geometry"), "{err}");
}

#[test]
fn test_select_scene() {
    let mut document = triangle_document();
    document["scenes"] = json!([{ "nodes": [] }, { "nodes": [0] }]);
    document["scene"] = json!(1);
    let gltf = parse(&document);

    assert_eq!(scene::select_scene(&gltf, None).unwrap(), Index::new(1));
    assert_eq!(scene::select_scene(&gltf, Some(0)).unwrap(), Index::new(0));
    let err = scene::select_scene(&gltf, Some(2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    document.as_object_mut().unwrap().remove("scene");
    assert_eq!(scene::select_scene(&parse(&document), None).unwrap(), Index::new(0));
}

#[test]
fn test_document_without_scenes() {
    let gltf = parse(&Fixture::new().finish(json!({})));
    assert!(scene::select_scene(&gltf, None).is_err());
}

#[test]
fn test_cycle_detected() {
    let mut document = hierarchy_document();
    document["nodes"][1]["children"] = json!([0]);
    let gltf = parse(&document);
    let err = Scene::new(&DummyBackend::new(), gltf, Index::new(0), &ViewerOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("ancestor"), "{err}");
}

#[test]
fn test_joint_only_scene_has_no_geometry() {
    let mut document = skinned_document();
    // Scene 1 only shows the joints.
    document["scenes"] = json!([{ "nodes": [0, 1] }, { "nodes": [1] }]);
    let gltf = parse(&document);
    let options = ViewerOptions::default();
    let err = Scene::new(&DummyBackend::new(), gltf, Index::new(1), &options).unwrap_err();
    // No mesh, no geometry.
    assert_eq!(err.kind(), ErrorKind::Format);

    let (_, scene) = build(&document, &options);
    assert_eq!(scene.skeletons().len(), 1);
}

#[test]
fn test_run_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("animated.gltf");
    std::fs::write(&path, animated_document().to_string()).unwrap();

    let backend = DummyBackend::new();
    let options = ViewerOptions {
        mode: Mode::Once,
        frames: 5,
        frame_time: 0.5,
        ..ViewerOptions::default()
    };
    let summary = run(&backend, &path, &options).unwrap();
    assert_eq!(summary.meshes, 1);
    assert_eq!(summary.skeletons, 0);
    assert_eq!(summary.animations, 1);
    assert_eq!(summary.frames, 5);
    assert_eq!(summary.draws, 5);
    assert_eq!(backend.draws().len(), 5);
}

#[test]
fn test_run_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&DummyBackend::new(), &dir.path().join("missing.gltf"), &ViewerOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
