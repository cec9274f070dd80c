use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tangents: bool,
    pub unwind: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single `.glb` package with the payload embedded
    Binary,
    /// `.gltf` document with sibling `.bin` payload files
    Document,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();

        match extension.as_str() {
            "glb" => Some(Self::Binary),
            "gltf" => Some(Self::Document),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ArgsError {
    MissingInput,
    InputNotFound(PathBuf),
    UnsupportedOutput(PathBuf),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsError::MissingInput => write!(f, "Input file isn't set"),
            ArgsError::InputNotFound(path) => {
                write!(f, "Input file {} doesn't exist", path.display())
            }
            ArgsError::UnsupportedOutput(path) => write!(
                f,
                "Output file extension should be either gltf or glb: {}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ArgsError {}

impl Args {
    pub fn validate(&self) -> Result<OutputFormat, ArgsError> {
        if self.input.as_os_str().is_empty() {
            return Err(ArgsError::MissingInput);
        }

        if !self.input.is_file() {
            return Err(ArgsError::InputNotFound(self.input.clone()));
        }

        match OutputFormat::from_path(&self.output) {
            Some(format) => Ok(format),
            None => Err(ArgsError::UnsupportedOutput(self.output.clone())),
        }
    }
}
