use anyhow::Result;
use gltf::json;

use crate::args::{Args, OutputFormat};
use crate::process::{tangent, winding};
use crate::resource::gltf::asset::file::FileSystemGltfAsset;
use crate::resource::gltf::asset::GltfAsset;
use crate::resource::gltf::loader::file::FileSystemGltfLoader;
use crate::resource::gltf::writer::file::FileSystemGltfWriter;
use crate::resource::gltf::writer::GltfWriter;

/// Drives a single load, process and write run over one asset.
pub struct App {
    args: Args,
    format: OutputFormat,
}

impl App {
    pub fn new(args: Args, format: OutputFormat) -> Self {
        App { args, format }
    }

    /// Returns the document as it was written to the output path.
    pub fn process(&self) -> Result<json::Root> {
        log::info!("Loading {}", self.args.input.display());

        let mut asset = FileSystemGltfAsset::from_path(&self.args.input)?;
        let mut loader = FileSystemGltfLoader::new(&asset);

        if self.args.tangents {
            log::info!("Generating tangents...");
            let generated = tangent::generate_tangent_frames(asset.document_mut(), &mut loader)?;
            log::debug!("Generated tangents for {generated} primitives");
        }

        if self.args.unwind {
            log::info!("Unwinding indices...");
            let unwound = winding::unwind_indices(asset.document(), &mut loader)?;
            log::debug!("Unwound {unwound} index accessors");
        }

        let writer = FileSystemGltfWriter::new(&self.args.output, self.format);
        writer.write(&mut asset, &mut loader)?;

        Ok(asset.into_document())
    }
}
