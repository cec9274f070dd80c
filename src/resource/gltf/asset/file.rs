use std::path::{Path, PathBuf};

use anyhow::Result;
use gltf::json;

use crate::error::Error;
use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::file::read_file;

pub struct FileSystemGltfAsset {
    document: json::Root,
    path: PathBuf,
    pub root: PathBuf,
}

impl FileSystemGltfAsset {
    pub fn from_path(gltf_path: &Path) -> Result<Self> {
        if !gltf_path.is_file() {
            return Err(Error::io(format!(
                "The given path is not a file: {}",
                gltf_path.display()
            ))
            .into());
        }

        let root = match gltf_path.parent() {
            Some(root) => root.to_path_buf(),
            None => {
                return Err(Error::io(format!(
                    "Unable to find the parent directory of the given path: {}",
                    gltf_path.display()
                ))
                .into())
            }
        };

        let data = read_file(gltf_path)?;
        let parsed_gltf = match gltf::Gltf::from_slice(&data) {
            Ok(parsed_gltf) => parsed_gltf,
            Err(error) => {
                return Err(Error::format(format!(
                    "Unable to parse {}: {error}",
                    gltf_path.display()
                ))
                .into())
            }
        };

        log::debug!(
            "Loaded {}: {} buffers, {} buffer views, {} accessors, {} meshes",
            gltf_path.display(),
            parsed_gltf.buffers().len(),
            parsed_gltf.views().len(),
            parsed_gltf.accessors().len(),
            parsed_gltf.meshes().len(),
        );

        Ok(Self {
            document: parsed_gltf.document.into_json(),
            path: gltf_path.to_path_buf(),
            root,
        })
    }

    pub fn into_document(self) -> json::Root {
        self.document
    }
}

impl GltfAsset for FileSystemGltfAsset {
    fn document(&self) -> &json::Root {
        &self.document
    }

    fn document_mut(&mut self) -> &mut json::Root {
        &mut self.document
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
