//! In-memory assets for unit tests.

use gltf::json;
use serde_json::{json, Value};

use crate::resource::gltf::loader::memory::MemoryGltfLoader;

const FLOAT: u32 = 5126;
const SHORT: u32 = 5122;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_INT: u32 = 5125;

/// Builds a single-buffer asset, one tightly packed buffer view per accessor.
pub struct AssetBuilder {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
}

impl AssetBuilder {
    pub fn new() -> Self {
        Self {
            data: vec![],
            views: vec![],
            accessors: vec![],
            meshes: vec![],
        }
    }

    pub fn push_accessor(
        &mut self,
        bytes: &[u8],
        component_type: u32,
        type_: &str,
        count: usize,
    ) -> usize {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }

        self.views.push(json!({
            "buffer": 0,
            "byteOffset": self.data.len(),
            "byteLength": bytes.len(),
        }));
        self.data.extend_from_slice(bytes);

        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "count": count,
            "type": type_,
        }));

        self.accessors.len() - 1
    }

    pub fn push_vec3(&mut self, values: &[[f32; 3]]) -> usize {
        self.push_accessor(bytemuck::cast_slice(values), FLOAT, "VEC3", values.len())
    }

    pub fn push_vec2(&mut self, values: &[[f32; 2]]) -> usize {
        self.push_accessor(bytemuck::cast_slice(values), FLOAT, "VEC2", values.len())
    }

    pub fn push_vec4(&mut self, values: &[[f32; 4]]) -> usize {
        self.push_accessor(bytemuck::cast_slice(values), FLOAT, "VEC4", values.len())
    }

    pub fn push_u16_indices(&mut self, values: &[u16]) -> usize {
        self.push_accessor(
            bytemuck::cast_slice(values),
            UNSIGNED_SHORT,
            "SCALAR",
            values.len(),
        )
    }

    pub fn push_i16_indices(&mut self, values: &[i16]) -> usize {
        self.push_accessor(bytemuck::cast_slice(values), SHORT, "SCALAR", values.len())
    }

    pub fn push_u32_indices(&mut self, values: &[u32]) -> usize {
        self.push_accessor(
            bytemuck::cast_slice(values),
            UNSIGNED_INT,
            "SCALAR",
            values.len(),
        )
    }

    /// Adds a mesh with one primitive per entry of `primitives`.
    pub fn push_mesh(&mut self, name: &str, primitives: Vec<Value>) -> usize {
        self.meshes.push(json!({
            "name": name,
            "primitives": primitives,
        }));

        self.meshes.len() - 1
    }

    pub fn finish(self) -> (json::Root, MemoryGltfLoader) {
        let document = json!({
            "asset": { "version": "2.0" },
            "buffers": [{ "byteLength": self.data.len(), "uri": "fixture.bin" }],
            "bufferViews": self.views,
            "accessors": self.accessors,
            "meshes": self.meshes,
        });

        let root: json::Root = serde_json::from_str(&document.to_string()).unwrap();

        (root, MemoryGltfLoader::new(vec![self.data]))
    }
}

pub fn quad_positions() -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]
}

pub fn quad_normals() -> Vec<[f32; 3]> {
    vec![[0.0, 0.0, 1.0]; 4]
}

pub fn quad_uvs() -> Vec<[f32; 2]> {
    vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
}

pub fn primitive(attributes: Value, indices: Option<usize>) -> Value {
    match indices {
        Some(indices) => json!({ "attributes": attributes, "indices": indices }),
        None => json!({ "attributes": attributes }),
    }
}
