use std::borrow::Cow;

use anyhow::Result;
use gltf::json;

use crate::error::Error;
use crate::process::accessor;

pub mod file;
#[cfg(test)]
pub mod memory;

/// Buffer cache shared by the processing passes.
///
/// `load_*` methods fetch missing buffers on demand, `read_*` methods only see
/// buffers that have already been loaded.
pub trait GltfLoader {
    fn load_buffer(&mut self, root: &json::Root, buffer_id: usize) -> Result<()>;
    fn buffer(&self, buffer_id: usize) -> Option<&[u8]>;
    fn buffer_mut(&mut self, buffer_id: usize) -> Option<&mut Vec<u8>>;
    fn set_buffer(&mut self, buffer_id: usize, data: Vec<u8>);
    fn clear(&mut self);

    fn load_buffers(&mut self, root: &json::Root) -> Result<()> {
        for buffer_id in 0..root.buffers.len() {
            self.load_buffer(root, buffer_id)?;
        }

        Ok(())
    }

    fn read_buffer(&self, buffer_id: usize) -> Result<&[u8]> {
        match self.buffer(buffer_id) {
            Some(data) => Ok(data),
            None => Err(Error::format(format!(
                "The given buffer ID is not associated with a loaded buffer: {buffer_id}"
            ))
            .into()),
        }
    }

    fn load_bytes_from_accessor(
        &mut self,
        root: &json::Root,
        accessor_id: usize,
    ) -> Result<Cow<'_, [u8]>> {
        let span = accessor::resolve(root, accessor_id)?;
        self.load_buffer(root, span.buffer)?;

        span.read(self.read_buffer(span.buffer)?)
    }

    fn read_bytes_from_accessor(
        &self,
        root: &json::Root,
        accessor_id: usize,
    ) -> Result<Cow<'_, [u8]>> {
        let span = accessor::resolve(root, accessor_id)?;

        span.read(self.read_buffer(span.buffer)?)
    }

    fn load_accessor_as<T: bytemuck::Pod>(
        &mut self,
        root: &json::Root,
        accessor_id: usize,
    ) -> Result<Vec<T>> {
        let bytes = self.load_bytes_from_accessor(root, accessor_id)?;

        accessor::decode(accessor_id, &bytes)
    }
}
