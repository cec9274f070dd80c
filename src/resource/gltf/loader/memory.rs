use std::collections::HashMap;

use anyhow::Result;
use gltf::json;

use crate::error::Error;
use crate::resource::gltf::loader::GltfLoader;

/// Loader over buffers that are already resident, e.g. assets built in code.
#[derive(Default)]
pub struct MemoryGltfLoader {
    buffer_registry: HashMap<usize, Vec<u8>>,
}

impl MemoryGltfLoader {
    pub fn new(buffers: Vec<Vec<u8>>) -> Self {
        Self {
            buffer_registry: buffers.into_iter().enumerate().collect(),
        }
    }
}

impl GltfLoader for MemoryGltfLoader {
    fn load_buffer(&mut self, _root: &json::Root, buffer_id: usize) -> Result<()> {
        if self.buffer_registry.contains_key(&buffer_id) {
            return Ok(());
        }

        Err(Error::io(format!("No data was provided for buffer {buffer_id}")).into())
    }

    fn buffer(&self, buffer_id: usize) -> Option<&[u8]> {
        self.buffer_registry.get(&buffer_id).map(Vec::as_slice)
    }

    fn buffer_mut(&mut self, buffer_id: usize) -> Option<&mut Vec<u8>> {
        self.buffer_registry.get_mut(&buffer_id)
    }

    fn set_buffer(&mut self, buffer_id: usize, data: Vec<u8>) {
        self.buffer_registry.insert(buffer_id, data);
    }

    fn clear(&mut self) {
        self.buffer_registry.clear();
    }
}
