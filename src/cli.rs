use std::path::PathBuf;

use clap::Parser;

/// Post-processes a glTF asset: generates tangent frames and flips triangle winding
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the .gltf or .glb file that will be processed
    pub input: PathBuf,

    /// Path of the result; the extension (.gltf or .glb) selects the container
    pub output: PathBuf,

    /// Generate tangent frames for every eligible triangle primitive
    #[arg(short = 't', long)]
    pub tangents: bool,

    /// Reverse the winding order of every indexed triangle
    #[arg(short = 'u', long)]
    pub unwind: bool,
}

impl From<Cli> for gltf_rework::args::Args {
    fn from(value: Cli) -> Self {
        gltf_rework::args::Args {
            input: value.input,
            output: value.output,
            tangents: value.tangents,
            unwind: value.unwind,
        }
    }
}
