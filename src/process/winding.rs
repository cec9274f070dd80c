use std::collections::HashSet;

use anyhow::Result;
use gltf::json;
use gltf::json::validation::Checked;

use crate::error::Error;
use crate::process::accessor;
use crate::process::indices::{self, IndexFormat};
use crate::process::mesh_label;
use crate::resource::gltf::loader::GltfLoader;

/// Reverses the vertex order of every triangle of every indexed primitive.
///
/// Index data is patched in place; accessors and buffer views are unchanged.
/// Returns the number of index accessors that were rewritten.
pub fn unwind_indices(root: &json::Root, loader: &mut impl GltfLoader) -> Result<usize> {
    let mut unwound = HashSet::new();

    for (mesh_id, mesh) in root.meshes.iter().enumerate() {
        for (primitive_id, primitive) in mesh.primitives.iter().enumerate() {
            if !matches!(primitive.mode, Checked::Valid(json::mesh::Mode::Triangles)) {
                log::warn!(
                    "Not unwinding mesh {} primitive {primitive_id} since it is not a triangle list",
                    mesh_label(mesh, mesh_id)
                );
                continue;
            }

            let (accessor_id, format) = indices::index_accessor(root, primitive)?;
            if !unwound.insert(accessor_id) {
                log::debug!("Index accessor {accessor_id} was already unwound");
                continue;
            }

            let span = accessor::resolve(root, accessor_id)?;
            if span.stride.is_some() {
                return Err(Error::format(format!(
                    "Index accessor {accessor_id} uses a strided buffer view"
                ))
                .into());
            }

            loader.load_buffer(root, span.buffer)?;
            let data = match loader.buffer_mut(span.buffer) {
                Some(data) => data,
                None => {
                    return Err(Error::format(format!(
                        "Buffer {} is not loaded",
                        span.buffer
                    ))
                    .into())
                }
            };

            if span.range().end > data.len() {
                return Err(Error::format(format!(
                    "Index accessor {accessor_id} reads past the end of buffer {}",
                    span.buffer
                ))
                .into());
            }

            let bytes = &mut data[span.range()];
            match format {
                IndexFormat::I16 => reverse_triangles::<i16>(accessor_id, bytes)?,
                IndexFormat::U16 => reverse_triangles::<u16>(accessor_id, bytes)?,
                IndexFormat::U32 => reverse_triangles::<u32>(accessor_id, bytes)?,
            }

            if span.count % 3 != 0 {
                log::warn!(
                    "Index accessor {accessor_id} of mesh {} has {} trailing indices that do not form a triangle",
                    mesh_label(mesh, mesh_id),
                    span.count % 3
                );
            }
        }
    }

    Ok(unwound.len())
}

/// Swaps the first and last index of every complete triangle in `bytes`.
pub fn reverse_triangles<T: bytemuck::Pod>(accessor_id: usize, bytes: &mut [u8]) -> Result<()> {
    let mut values = accessor::decode::<T>(accessor_id, bytes)?;

    for triangle in values.chunks_exact_mut(3) {
        triangle.swap(0, 2);
    }

    accessor::encode(&values, bytes);

    Ok(())
}
