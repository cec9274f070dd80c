use anyhow::Result;
use gltf::json;
use gltf::json::validation::USize64;

use crate::error::Error;
use crate::resource::gltf::loader::GltfLoader;

/// Merges every buffer into buffer 0, rebasing the buffer views onto it.
///
/// Each source buffer starts at a 4 byte aligned offset. Does nothing when the
/// asset has at most one buffer.
pub fn collapse_buffers(root: &mut json::Root, loader: &mut impl GltfLoader) -> Result<()> {
    if root.buffers.len() <= 1 {
        return Ok(());
    }

    loader.load_buffers(root)?;

    let mut data = vec![];
    let mut bases = Vec::with_capacity(root.buffers.len());
    for buffer_id in 0..root.buffers.len() {
        data.resize(data.len().next_multiple_of(4), 0);
        bases.push(data.len());
        data.extend_from_slice(loader.read_buffer(buffer_id)?);
    }

    if let Some(view) = root
        .buffer_views
        .iter()
        .find(|view| view.buffer.value() >= bases.len())
    {
        return Err(Error::format(format!(
            "A buffer view references a missing buffer: {}",
            view.buffer.value()
        ))
        .into());
    }

    for view in root.buffer_views.iter_mut() {
        let base = bases[view.buffer.value()];
        let offset = view.byte_offset.map_or(0, |offset| offset.0 as usize);

        view.buffer = json::Index::new(0);
        view.byte_offset = Some(USize64::from(base + offset));
    }

    log::debug!(
        "Collapsed {} buffers into one of {} bytes",
        root.buffers.len(),
        data.len()
    );

    root.buffers.truncate(1);
    root.buffers[0].byte_length = USize64::from(data.len());

    loader.clear();
    loader.set_buffer(0, data);

    Ok(())
}
