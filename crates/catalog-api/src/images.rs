// Image endpoints
//
// Multipart upload to `/api/image` and deletion by id.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::CatalogClient;
use crate::error::Error;
use crate::models::ApiImage;

/// Multipart field name the server reads the file from.
const IMAGE_FIELD: &str = "image";

impl CatalogClient {
    /// Upload an image file.
    ///
    /// `POST /api/image` (multipart, field `image`)
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<ApiImage, Error> {
        let url = self.api_url("image")?;
        debug!(file_name, content_type, size = data.len(), "uploading image");

        let part = Part::bytes(data.to_vec())
            .file_name(file_name.to_owned())
            .mime_str(content_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        self.post_multipart(url, form).await
    }

    /// Delete an uploaded image.
    ///
    /// `DELETE /api/image/{id}`
    pub async fn delete_image(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("image/{id}"))?;
        debug!(id, "deleting image");
        self.delete(url).await
    }
}
