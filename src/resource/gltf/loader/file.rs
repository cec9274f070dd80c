use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use base64::Engine;
use gltf::json;

use crate::error::Error;
use crate::resource::gltf::asset::file::FileSystemGltfAsset;
use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::GltfLoader;

pub struct FileSystemGltfLoader {
    path: PathBuf,
    root: PathBuf,
    buffer_registry: HashMap<usize, Vec<u8>>,
}

impl FileSystemGltfLoader {
    pub fn new(asset: &FileSystemGltfAsset) -> Self {
        Self {
            path: asset.path().to_path_buf(),
            root: asset.root.clone(),
            buffer_registry: HashMap::new(),
        }
    }

    fn load_buffer_data(&self, buffer: &json::Buffer) -> Result<Vec<u8>> {
        match buffer.uri.as_deref() {
            None => self.load_embedded_data(),
            Some(uri) if uri.starts_with("data:") => decode_data_uri(uri),
            Some(uri) => {
                let buffer_path = self.root.join(uri);
                match std::fs::read(&buffer_path) {
                    Ok(data) => Ok(data),
                    Err(error) => Err(Error::io(format!(
                        "Unable to read buffer file {}: {error}",
                        buffer_path.display()
                    ))
                    .into()),
                }
            }
        }
    }

    fn load_embedded_data(&self) -> Result<Vec<u8>> {
        let data = read_file(&self.path)?;

        let glb = match gltf::binary::Glb::from_slice(&data) {
            Ok(glb) => glb,
            Err(error) => {
                return Err(Error::format(format!(
                    "Unable to read the binary container {}: {error}",
                    self.path.display()
                ))
                .into())
            }
        };

        match glb.bin {
            Some(bin) => Ok(bin.into_owned()),
            None => Err(Error::format(format!(
                "The binary container has no BIN chunk: {}",
                self.path.display()
            ))
            .into()),
        }
    }
}

impl GltfLoader for FileSystemGltfLoader {
    fn load_buffer(&mut self, root: &json::Root, buffer_id: usize) -> Result<()> {
        if self.buffer_registry.contains_key(&buffer_id) {
            return Ok(());
        }

        let buffer = match root.buffers.get(buffer_id) {
            Some(buffer) => buffer,
            None => {
                return Err(
                    Error::format(format!("The given buffer ID is invalid: {buffer_id}")).into(),
                )
            }
        };

        let mut data = self.load_buffer_data(buffer)?;

        let byte_length = buffer.byte_length.0 as usize;
        if data.len() < byte_length {
            return Err(Error::format(format!(
                "Buffer {buffer_id} declares {byte_length} bytes but only {} are available",
                data.len()
            ))
            .into());
        }
        data.truncate(byte_length);

        log::debug!("Loaded buffer {buffer_id} ({byte_length} bytes)");
        self.buffer_registry.insert(buffer_id, data);

        Ok(())
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

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => Ok(data),
        Err(error) => {
            Err(Error::io(format!("Unable to read {}: {error}", path.display())).into())
        }
    }
}

pub(crate) fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = match uri.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => {
            return Err(Error::format(String::from(
                "Only base64 encoded data URIs are supported for buffers",
            ))
            .into())
        }
    };

    match base64::engine::general_purpose::STANDARD.decode(payload) {
        Ok(data) => Ok(data),
        Err(error) => Err(Error::format(format!("Invalid base64 buffer data: {error}")).into()),
    }
}
