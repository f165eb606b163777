use std::path::Path;

use crate::error::ClientError;

/// An image file attached to a create or update request as the `image`
/// multipart part.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reads `path` into memory and guesses its content type from the
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Image`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Image {
                path: path.display().to_string(),
                source: e,
            })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self {
            mime: mime_for(&file_name),
            file_name,
            bytes,
        })
    }

    pub(crate) fn into_part(self) -> Result<reqwest::multipart::Part, ClientError> {
        Ok(reqwest::multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.mime)?)
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
