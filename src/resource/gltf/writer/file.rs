use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Result;
use gltf::json;
use gltf::json::validation::USize64;

use crate::args::OutputFormat;
use crate::error::Error;
use crate::process::consolidate;
use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::GltfLoader;
use crate::resource::gltf::writer::GltfWriter;

pub struct FileSystemGltfWriter {
    output: PathBuf,
    format: OutputFormat,
}

impl FileSystemGltfWriter {
    pub fn new(output: &Path, format: OutputFormat) -> Self {
        Self {
            output: output.to_path_buf(),
            format,
        }
    }

    fn write_binary(&self, root: &mut json::Root, loader: &mut impl GltfLoader) -> Result<()> {
        consolidate::collapse_buffers(root, loader)?;
        loader.load_buffers(root)?;

        // The payload travels in the BIN chunk, so no buffer keeps a URI.
        for buffer in root.buffers.iter_mut() {
            buffer.uri = None;
        }

        let bin = match root.buffers.first_mut() {
            Some(buffer) => {
                let data = loader.read_buffer(0)?;
                buffer.byte_length = USize64::from(data.len());
                Some(Cow::Borrowed(data))
            }
            None => None,
        };

        let json = match serde_json::to_vec(&*root) {
            Ok(json) => json,
            Err(error) => {
                return Err(Error::format(format!("Unable to serialize the document: {error}")).into())
            }
        };

        let glb = gltf::binary::Glb {
            header: gltf::binary::Header {
                magic: *b"glTF",
                version: 2,
                // Recomputed from the chunks by `to_writer`.
                length: 0,
            },
            json: Cow::Owned(json),
            bin,
        };

        let mut data = vec![];
        if let Err(error) = glb.to_writer(&mut data) {
            return Err(Error::format(format!("Unable to assemble the binary container: {error}")).into());
        }

        write_file(&self.output, &data)
    }

    fn write_document(
        &self,
        root: &mut json::Root,
        loader: &mut impl GltfLoader,
        input_name: Option<&str>,
    ) -> Result<()> {
        let output_folder = self.output.parent().unwrap_or(Path::new(""));
        let output_name = match self.output.file_stem().and_then(|stem| stem.to_str()) {
            Some(name) => name.to_string(),
            None => {
                return Err(Error::io(format!(
                    "The output path has no valid file name: {}",
                    self.output.display()
                ))
                .into())
            }
        };
        let name_changed = input_name != Some(output_name.as_str());

        loader.load_buffers(root)?;

        for (buffer_id, buffer) in root.buffers.iter_mut().enumerate() {
            let externalize = match buffer.uri.as_deref() {
                Some(uri) => name_changed || uri.starts_with("data:"),
                None => true,
            };

            let uri = match (&buffer.uri, externalize) {
                (Some(uri), false) => uri.clone(),
                _ if buffer_id == 0 => format!("{output_name}.bin"),
                _ => format!("{output_name}_{buffer_id}.bin"),
            };

            let data = loader.read_buffer(buffer_id)?;
            buffer.byte_length = USize64::from(data.len());
            buffer.uri = Some(uri.clone());

            write_file(&output_folder.join(uri), data)?;
        }

        let document = match serde_json::to_vec_pretty(&*root) {
            Ok(document) => document,
            Err(error) => {
                return Err(Error::format(format!("Unable to serialize the document: {error}")).into())
            }
        };

        write_file(&self.output, &document)
    }
}

impl GltfWriter for FileSystemGltfWriter {
    fn write(&self, asset: &mut impl GltfAsset, loader: &mut impl GltfLoader) -> Result<()> {
        let input_name = asset.file_stem().map(String::from);

        match self.format {
            OutputFormat::Binary => self.write_binary(asset.document_mut(), loader),
            OutputFormat::Document => {
                self.write_document(asset.document_mut(), loader, input_name.as_deref())
            }
        }
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Err(error) = std::fs::write(path, data) {
        return Err(Error::io(format!("Unable to write {}: {error}", path.display())).into());
    }

    log::info!("Wrote {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, AssetBuilder};
    use crate::resource::gltf::loader::memory::MemoryGltfLoader;

    struct StubAsset {
        document: json::Root,
        path: PathBuf,
    }

    impl GltfAsset for StubAsset {
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

    fn quad_asset(input: &str) -> (StubAsset, MemoryGltfLoader) {
        let mut builder = AssetBuilder::new();
        let positions = builder.push_vec3(&fixtures::quad_positions());
        let indices = builder.push_u16_indices(&[0, 1, 2, 0, 2, 3]);
        builder.push_mesh(
            "quad",
            vec![fixtures::primitive(
                serde_json::json!({ "POSITION": positions }),
                Some(indices),
            )],
        );
        let (document, loader) = builder.finish();

        (
            StubAsset {
                document,
                path: PathBuf::from(input),
            },
            loader,
        )
    }

    #[test]
    fn binary_output_embeds_the_payload() {
        let folder = tempfile::tempdir().unwrap();
        let output = folder.path().join("quad.glb");
        let (mut asset, mut loader) = quad_asset("quad.gltf");
        let payload = loader.read_buffer(0).unwrap().to_vec();

        FileSystemGltfWriter::new(&output, OutputFormat::Binary)
            .write(&mut asset, &mut loader)
            .unwrap();

        let data = std::fs::read(&output).unwrap();
        let glb = gltf::binary::Glb::from_slice(&data).unwrap();
        assert_eq!(glb.header.length as usize, data.len());
        assert_eq!(&glb.bin.unwrap()[..payload.len()], payload.as_slice());

        let root: json::Root = serde_json::from_slice(&glb.json).unwrap();
        assert_eq!(root.buffers.len(), 1);
        assert!(root.buffers[0].uri.is_none());
        assert_eq!(root.buffers[0].byte_length.0 as usize, payload.len());
    }

    #[test]
    fn document_output_renames_the_payload() {
        let folder = tempfile::tempdir().unwrap();
        let output = folder.path().join("renamed.gltf");
        let (mut asset, mut loader) = quad_asset("quad.gltf");

        FileSystemGltfWriter::new(&output, OutputFormat::Document)
            .write(&mut asset, &mut loader)
            .unwrap();

        assert_eq!(
            asset.document().buffers[0].uri.as_deref(),
            Some("renamed.bin")
        );
        assert_eq!(
            std::fs::read(folder.path().join("renamed.bin")).unwrap(),
            loader.read_buffer(0).unwrap()
        );

        let written: json::Root =
            serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(written.buffers[0].uri.as_deref(), Some("renamed.bin"));
    }

    #[test]
    fn document_output_keeps_the_payload_name() {
        let folder = tempfile::tempdir().unwrap();
        let output = folder.path().join("quad.gltf");
        let (mut asset, mut loader) = quad_asset("quad.gltf");

        FileSystemGltfWriter::new(&output, OutputFormat::Document)
            .write(&mut asset, &mut loader)
            .unwrap();

        assert_eq!(
            asset.document().buffers[0].uri.as_deref(),
            Some("fixture.bin")
        );
        assert!(folder.path().join("fixture.bin").is_file());
    }

    #[test]
    fn document_output_externalizes_data_uris() {
        let folder = tempfile::tempdir().unwrap();
        let output = folder.path().join("quad.gltf");
        let (mut asset, mut loader) = quad_asset("quad.gltf");
        asset.document_mut().buffers[0].uri =
            Some("data:application/octet-stream;base64,AAAA".to_string());

        FileSystemGltfWriter::new(&output, OutputFormat::Document)
            .write(&mut asset, &mut loader)
            .unwrap();

        assert_eq!(asset.document().buffers[0].uri.as_deref(), Some("quad.bin"));
        assert!(folder.path().join("quad.bin").is_file());
    }
}
