#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Format(String),

    #[error("Accessor {accessor_id} is not supported: {reason}")]
    UnsupportedAccessor { accessor_id: usize, reason: String },

    #[error("Index accessor {accessor_id} uses an unsupported encoding: {encoding}")]
    UnsupportedIndexType {
        accessor_id: usize,
        encoding: String,
    },

    #[error("The given primitive has no index accessor")]
    MissingIndices,

    #[error(
        "Accessor {accessor_id} spans {length} bytes which is not a multiple of the element size {element_size}"
    )]
    SizeMismatch {
        accessor_id: usize,
        length: usize,
        element_size: usize,
    },

    #[error("Tangent generation failed for mesh {mesh} primitive {primitive}")]
    TangentGenerationFailure { mesh: String, primitive: usize },
}

impl Error {
    pub fn io(message: String) -> Self {
        Self::Io(message)
    }

    pub fn format(message: String) -> Self {
        Self::Format(message)
    }
}
