use anyhow::Result;

use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::GltfLoader;

pub mod file;

pub trait GltfWriter {
    /// Serializes the asset, flushing every buffer the loader holds for it.
    fn write(&self, asset: &mut impl GltfAsset, loader: &mut impl GltfLoader) -> Result<()>;
}
