//! Scenario tests for document loading and buffer resolution.
//!
//! Fixtures are assembled as JSON with base64 data URIs so that no file
//! on disk is needed unless a test is about file URIs.

use base64::Engine as _;

use crate::gltf::Gltf;

mod load_test;

/// Encodes `bytes` as an `application/octet-stream` data URI.
fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Little-endian bytes of a slice of plain values.
fn bytes_of<T: bytemuck::Pod>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

/// Parses a fixture, panicking with the loader error on failure.
fn parse(json: &serde_json::Value) -> Gltf {
    Gltf::from_json(&json.to_string(), "fixture.gltf").unwrap_or_else(|err| panic!("fixture failed to load: {err}"))
}

/// One triangle in the XY plane, positions only.
fn triangle_positions() -> Vec<f32> {
    vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
}

/// One scene, one node, one mesh with a single non-indexed triangle.
fn triangle_document() -> serde_json::Value {
    let positions = bytes_of(&triangle_positions());
    serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "main", "nodes": [0] }],
        "nodes": [{ "name": "triangle", "mesh": 0 }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "buffers": [{ "uri": data_uri(&positions), "byteLength": positions.len() }],
        "bufferViews": [{ "buffer": 0, "byteLength": positions.len(), "target": 34962 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    })
}
