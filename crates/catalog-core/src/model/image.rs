// ── Staged image payloads ──
//
// An image the user picked for upload but that the server has not seen
// yet. Content type is validated on construction so a bad file is
// rejected before any network traffic.

use std::fmt;

use bytes::Bytes;

use crate::error::CoreError;

/// Content types the server accepts for item images.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/pjpeg", "image/png"];

/// A client-side image file awaiting upload.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedImage {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl StagedImage {
    /// Stage an image. Fails with [`CoreError::InvalidImage`] for empty
    /// payloads or unsupported content types.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Self, CoreError> {
        let file_name = file_name.into();
        let content_type = content_type.into().trim().to_ascii_lowercase();
        let data = data.into();

        if !ACCEPTED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(CoreError::InvalidImage {
                message: format!(
                    "{file_name}: unsupported content type '{content_type}' (expected one of {})",
                    ACCEPTED_IMAGE_TYPES.join(", ")
                ),
            });
        }
        if data.is_empty() {
            return Err(CoreError::InvalidImage {
                message: format!("{file_name}: file is empty"),
            });
        }

        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    /// Guess a content type from a file name's extension.
    pub fn content_type_for(file_name: &str) -> Option<&'static str> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => Some("image/jpeg"),
            "png" => Some("image/png"),
            _ => None,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Image bytes stay out of logs.
impl fmt::Debug for StagedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}
