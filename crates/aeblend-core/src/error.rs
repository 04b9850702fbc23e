/// Core error types for the aeblend exporter.
use std::path::PathBuf;

/// A specialized Result type for aeblend operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Top-level error type encompassing all aeblend subsystems.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The export cannot start at all (no composition, empty scene, ...).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A failure while exporting one layer, annotated with the layer's name
    /// so the user knows which layer to fix (e.g. by deselecting it).
    #[error("error exporting layer \"{name}\": {source}")]
    Layer {
        name: String,
        #[source]
        source: Box<ExportError>,
    },

    /// A keyframe carries an interpolation code outside the known set.
    #[error("could not un-enum interpolation type {0}")]
    CouldNotUnenum(u32),

    /// A separation follower property reported more than one dimension.
    #[error("separation follower cannot have more than 1 dimension (got {0})")]
    SeparationFollower(usize),

    /// A layer that is neither a camera nor a visual layer was encountered.
    #[error("unsupported layer type for layer \"{0}\"")]
    UnsupportedLayer(String),

    #[error("scene validation error: {0}")]
    SceneValidation(String),

    #[error("output error: {message} ({path:?})")]
    Output { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ExportError {
    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        ExportError::Precondition(message.into())
    }

    /// Wrap an error with the name of the layer it occurred on.
    pub fn for_layer(name: impl Into<String>, source: ExportError) -> Self {
        ExportError::Layer {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create an output-file error.
    pub fn output(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ExportError::Output {
            message: message.into(),
            path: path.into(),
        }
    }
}
