//! Fixture documents for the viewer scenario tests.
//!
//! Binary data is gathered in a single buffer embedded as a base64 data URI.

#![allow(dead_code)]

use arte_core::gltf::Gltf;
use base64::Engine as _;
use serde_json::{json, Value};

/// Accumulates buffer views and accessors over one embedded buffer.
#[derive(Debug, Default)]
pub struct Fixture {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `values` as a new buffer view and returns its index.
    pub fn view<T: bytemuck::Pod>(&mut self, values: &[T], target: Option<u32>) -> usize {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let mut view = json!({
            "buffer": 0,
            "byteOffset": self.data.len(),
            "byteLength": bytes.len()
        });
        if let Some(target) = target {
            view["target"] = json!(target);
        }
        self.data.extend_from_slice(bytes);
        self.views.push(view);
        self.views.len() - 1
    }

    /// Appends an accessor and returns its index.
    pub fn accessor(&mut self, accessor: Value) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// A float VEC3 accessor over a new view, with bounds computed.
    pub fn positions(&mut self, positions: &[[f32; 3]]) -> usize {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        let view = self.view(positions, Some(ARRAY_BUFFER));
        self.accessor(json!({
            "bufferView": view,
            "componentType": FLOAT,
            "count": positions.len(),
            "type": "VEC3",
            "min": min,
            "max": max
        }))
    }

    /// A float accessor of `element_type` over a new view without target.
    pub fn floats<T: bytemuck::Pod>(&mut self, values: &[T], element_type: &str) -> usize {
        let view = self.view(values, None);
        let count = std::mem::size_of_val(values)
            / (std::mem::size_of::<f32>() * components(element_type));
        self.accessor(json!({
            "bufferView": view,
            "componentType": FLOAT,
            "count": count,
            "type": element_type
        }))
    }

    /// Adds the buffer, views and accessors to `document`.
    pub fn finish(self, mut document: Value) -> Value {
        document["asset"] = json!({ "version": "2.0" });
        if !self.data.is_empty() {
            document["buffers"] = json!([{ "uri": data_uri(&self.data), "byteLength": self.data.len() }]);
        }
        document["bufferViews"] = Value::Array(self.views);
        document["accessors"] = Value::Array(self.accessors);
        document
    }
}

pub const FLOAT: u32 = 5126;
pub const UNSIGNED_SHORT: u32 = 5123;
pub const ARRAY_BUFFER: u32 = 34962;
pub const ELEMENT_ARRAY_BUFFER: u32 = 34963;

fn components(element_type: &str) -> usize {
    match element_type {
        "SCALAR" => 1,
        "VEC2" => 2,
        "VEC3" => 3,
        "VEC4" | "MAT2" => 4,
        "MAT3" => 9,
        "MAT4" => 16,
        other => panic!("unknown element type {other}"),
    }
}

pub fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Parses a fixture, panicking with the loader error on failure.
pub fn parse(document: &Value) -> Gltf {
    Gltf::from_json(&document.to_string(), "fixture.gltf")
        .unwrap_or_else(|err| panic!("fixture failed to load: {err}"))
}

/// One node showing a single non-indexed triangle in the XY plane.
pub fn triangle_document() -> Value {
    let mut fixture = Fixture::new();
    let positions = fixture.positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    fixture.finish(json!({
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "triangle", "mesh": 0 }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": positions } }] }]
    }))
}

/// A triangle whose node translation goes linearly from the origin to
/// (1, 1, 1) over one second.
pub fn animated_document() -> Value {
    let mut fixture = Fixture::new();
    let positions = fixture.positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let input = fixture.floats(&[0.0f32, 1.0], "SCALAR");
    let output = fixture.floats(&[[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]], "VEC3");
    fixture.finish(json!({
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": [0.0, 0.0, 0.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": positions } }] }],
        "animations": [{
            "name": "move",
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
            "samplers": [{ "input": input, "output": output, "interpolation": "LINEAR" }]
        }]
    }))
}

/// A skinned triangle bound to a two joint chain.
///
/// Node 0 shows the mesh with skin 0. Node 1 is the root joint, translated
/// by (1, 0, 0); node 2 is its child, translated by (0, 2, 0). Inverse bind
/// matrices are translations by (-1, 0, 0) and (0, -1, 0).
pub fn skinned_document() -> Value {
    let mut fixture = Fixture::new();
    let positions = fixture.positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let joints_view = fixture.view(&[[0u16, 0, 0, 0], [1, 0, 0, 0], [1, 0, 0, 0]], Some(ARRAY_BUFFER));
    let joints = fixture.accessor(json!({
        "bufferView": joints_view,
        "componentType": UNSIGNED_SHORT,
        "count": 3,
        "type": "VEC4"
    }));
    let weights_view = fixture.view(&[[1.0f32, 0.0, 0.0, 0.0]; 3], Some(ARRAY_BUFFER));
    let weights = fixture.accessor(json!({
        "bufferView": weights_view,
        "componentType": FLOAT,
        "count": 3,
        "type": "VEC4"
    }));
    let inverse_bind = fixture.floats(
        &[translation_columns(-1.0, 0.0, 0.0), translation_columns(0.0, -1.0, 0.0)],
        "MAT4",
    );
    fixture.finish(json!({
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "name": "body", "mesh": 0, "skin": 0 },
            { "name": "root", "children": [2], "translation": [1.0, 0.0, 0.0] },
            { "name": "tip", "translation": [0.0, 2.0, 0.0] }
        ],
        "meshes": [{
            "primitives": [{
                "attributes": { "POSITION": positions, "JOINTS_0": joints, "WEIGHTS_0": weights }
            }]
        }],
        "skins": [{ "inverseBindMatrices": inverse_bind, "joints": [1, 2] }]
    }))
}

/// Column-major translation matrix.
pub fn translation_columns(x: f32, y: f32, z: f32) -> [f32; 16] {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        x, y, z, 1.0,
    ]
}
