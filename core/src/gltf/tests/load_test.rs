//! Document loading: sections, defaults, cross-reference checks and cursors.

use serde_json::json;

use crate::gltf::{
    Accessor, ErrorKind, Gltf, GltfError, Index, Mesh, Node, Scene, Skin, Transformation, Uri,
};

use super::{parse, triangle_document};

#[test]
fn test_triangle_document() {
    let gltf = parse(&triangle_document());

    assert_eq!(gltf.count::<Scene>(), 1);
    assert_eq!(gltf.count::<Node>(), 1);
    assert_eq!(gltf.count::<Mesh>(), 1);
    assert_eq!(gltf.count::<Accessor>(), 1);
    assert_eq!(gltf.count::<Skin>(), 0);
    assert_eq!(gltf.animations().len(), 0);

    let scene = gltf.default_scene().expect("default scene");
    assert_eq!(scene.name, "main");
    assert_eq!(scene.to_string(), "<Scene> main nodes: [#0]");

    let node = scene.iterate(|s| s.nodes.as_slice()).next().expect("root node");
    assert_eq!(node.name, "triangle");
    assert!(matches!(node.transformation, Transformation::Matrix(m) if m.is_identity(0.0)));

    let mesh = node.get_optional(|n| n.mesh).expect("mesh");
    let primitive = mesh.members(|m| m.primitives.as_slice()).next().expect("primitive");
    assert_eq!(primitive.position(), 0);
    let position = primitive.get(|p| p.attributes["POSITION"]);
    assert_eq!(position.id(), Index::new(0));
    assert_eq!(position.count, 3);
}

#[test]
fn test_missing_sections_are_empty() {
    let gltf = parse(&json!({ "asset": { "version": "2.0" } }));
    assert!(gltf.default_scene().is_none());
    assert_eq!(gltf.scenes().len(), 0);
    assert_eq!(gltf.meshes().len(), 0);
}

#[test]
fn test_checked_get() {
    let gltf = parse(&triangle_document());
    assert!(gltf.get(Index::<Mesh>::new(0)).is_ok());

    let err = gltf.get(Index::<Mesh>::new(3)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "document: mesh index 3 is out of range (1 declared)"
    );
}

#[test]
fn test_get_mut_edits_in_place() {
    let mut gltf = parse(&triangle_document());
    gltf.get_mut(Index::<Node>::new(0)).unwrap().name = "renamed".into();
    assert_eq!(gltf.get(Index::<Node>::new(0)).unwrap().name, "renamed");
    assert!(gltf.get_mut(Index::<Node>::new(1)).is_err());
}

#[test]
fn test_dangling_reference_fails_load() {
    let mut document = triangle_document();
    document["nodes"][0]["mesh"] = json!(7);
    let err = Gltf::from_json(&document.to_string(), "broken.gltf").unwrap_err();
    assert!(matches!(
        err,
        GltfError::DanglingIndex { kind: "mesh", index: 7, len: 1, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_dangling_primitive_attribute() {
    let mut document = triangle_document();
    document["meshes"][0]["primitives"][0]["attributes"]["NORMAL"] = json!(4);
    let err = Gltf::from_json(&document.to_string(), "broken.gltf").unwrap_err();
    assert_eq!(
        err.to_string(),
        "meshes[0].primitives[0]: accessor index 4 is out of range (1 declared)"
    );
}

#[test]
fn test_buffer_view_must_fit_buffer() {
    let mut document = triangle_document();
    document["bufferViews"][0]["byteOffset"] = json!(4);
    let err = Gltf::from_json(&document.to_string(), "broken.gltf").unwrap_err();
    assert!(matches!(err, GltfError::OutOfRange { start: 4, end: 40, len: 36, .. }));
}

#[test]
fn test_invalid_json() {
    let err = Gltf::from_json("{ \"scenes\": [", "broken.gltf").unwrap_err();
    assert!(matches!(err, GltfError::Json(_)));
}

#[test]
fn test_unknown_enum_string_fails_load() {
    let mut document = triangle_document();
    document["accessors"][0]["type"] = json!("VEC7");
    let err = Gltf::from_json(&document.to_string(), "broken.gltf").unwrap_err();
    assert_eq!(err.to_string(), "accessors[0]: unknown accessor type 'VEC7'");
}

#[test]
fn test_skin_joints_are_flagged() {
    let gltf = parse(&json!({
        "nodes": [
            { "name": "body", "mesh": 0, "skin": 0 },
            { "name": "hip", "children": [2] },
            { "name": "knee" },
            { "name": "prop" }
        ],
        "meshes": [{ "primitives": [{ "attributes": {} }] }],
        "skins": [{ "joints": [1, 2], "skeleton": 1 }]
    }));

    let flags: Vec<bool> = gltf.nodes().map(|node| node.used_as_joint).collect();
    assert_eq!(flags, vec![false, true, true, false]);

    let skin = gltf.skins().next().unwrap();
    let joints: Vec<String> = skin.iterate(|s| s.joints.as_slice()).map(|j| j.name.clone()).collect();
    assert_eq!(joints, vec!["hip", "knee"]);
    assert!(skin.inverse_bind_matrices.is_none());
}

#[test]
fn test_skin_requires_joints() {
    let err = Gltf::from_json(r#"{ "skins": [{ "skeleton": 0 }] }"#, "broken.gltf").unwrap_err();
    assert_eq!(err.to_string(), "skins[0]: missing required field 'joints'");
}

#[test]
fn test_path_for_decodes_uri() {
    let gltf = Gltf::from_json("{}", "assets/models/scene.gltf").unwrap();
    let path = gltf.path_for(&Uri::new("textures/my%20albedo.png"));
    assert_eq!(
        path,
        std::path::Path::new("assets/models/textures/my albedo.png")
    );
}

#[test]
fn test_load_from_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("triangle.gltf");
    std::fs::write(&path, triangle_document().to_string()).unwrap();

    let gltf = Gltf::load(&path).unwrap();
    assert_eq!(gltf.path(), path.as_path());
    assert_eq!(gltf.count::<Mesh>(), 1);
}

#[test]
fn test_load_missing_file() {
    let directory = tempfile::tempdir().unwrap();
    let err = Gltf::load(directory.path().join("absent.gltf")).unwrap_err();
    assert!(matches!(err, GltfError::Open { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
}
