//! Reading transcripts from disk.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::AnalysisError;
use crate::parser::decode_transcript;

/// A transcript loaded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub path: PathBuf,
    pub text: String,
    /// `blake3:<hex>` digest of the raw bytes, for keying stored results.
    pub source_hash: String,
}

/// Read and decode the transcript at `path`.
///
/// # Errors
///
/// [`AnalysisError::NotFound`] when nothing exists at `path`, otherwise
/// [`AnalysisError::Read`] for any other I/O failure.
#[instrument]
pub fn read_transcript(path: &Path) -> Result<Transcript, AnalysisError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            AnalysisError::NotFound(path.to_path_buf())
        } else {
            AnalysisError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    debug!(bytes = bytes.len(), "read transcript");

    Ok(Transcript {
        path: path.to_path_buf(),
        source_hash: source_hash(&bytes),
        text: decode_transcript(&bytes),
    })
}

/// Content digest of transcript bytes.
#[must_use]
pub fn source_hash(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes))
}
