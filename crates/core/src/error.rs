use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manual file is corrupt: {}: {source}", .path.display())]
    LedgerParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode manual: {0}")]
    LedgerEncode(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("unsupported image format{}", .0.as_ref().map(|p| format!(": {}", p.display())).unwrap_or_default())]
    UnsupportedFormat(Option<PathBuf>),

    #[error("image not found in catalog: {0}")]
    ImageNotFound(String),
}

impl Error {
    /// True when a write to durable storage failed and the operation was not applied.
    pub fn is_storage_write(&self) -> bool {
        matches!(self, Error::StorageWrite { .. })
    }

    /// True when the manual file exists but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::LedgerParse { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
