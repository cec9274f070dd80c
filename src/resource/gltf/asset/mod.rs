use std::path::Path;

use gltf::json;

pub mod file;

pub trait GltfAsset {
    fn document(&self) -> &json::Root;
    fn document_mut(&mut self) -> &mut json::Root;
    fn path(&self) -> &Path;

    fn file_stem(&self) -> Option<&str> {
        self.path().file_stem().and_then(|stem| stem.to_str())
    }
}
