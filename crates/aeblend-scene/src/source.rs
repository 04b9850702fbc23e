use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity of an underlying media asset. Two sources with identical
/// pixel data but distinct ids are distinct assets; deduplication during
/// export compares ids, never values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What backs a media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    /// A solid color fill (RGB, 0.0–1.0 per channel).
    Solid { color: [f64; 3] },
    /// Footage backed by a file on disk.
    File { path: PathBuf },
    /// Anything the snapshot could not classify.
    Unknown,
}

/// A media source referenced by visual layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub kind: SourceKind,
}

impl Source {
    pub fn new(id: SourceId, name: impl Into<String>, width: u32, height: u32, kind: SourceKind) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            kind,
        }
    }

    /// Create a solid-color source.
    pub fn solid(id: SourceId, name: impl Into<String>, width: u32, height: u32, color: [f64; 3]) -> Self {
        Self::new(id, name, width, height, SourceKind::Solid { color })
    }

    /// Create a file-backed source.
    pub fn file(
        id: SourceId,
        name: impl Into<String>,
        width: u32,
        height: u32,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(id, name, width, height, SourceKind::File { path: path.into() })
    }
}
