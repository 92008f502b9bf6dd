//! Handles to user-selected files and the data URLs built from them.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// File type hint offered by the intake. Not enforced.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Failure to turn a selected file into a displayable reference.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file picked or dropped by the user.
///
/// Only the path is held; bytes are read when a consumer needs them, so a file that
/// disappears between the upload and the preview read fails at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    path: PathBuf,
    name: String,
    mime: String,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
        Self { path, name, mime }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Guessed from the extension, `application/octet-stream` when unknown.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Reads the whole file and encodes it as a `data:` URL.
    pub async fn read_as_data_url(&self) -> Result<String, ReadError> {
        let bytes = self.read().await.map_err(|source| ReadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(data_url(&self.mime, &bytes))
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Splits a base64 `data:` URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Option<(&str, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime, bytes))
}
