use std::path::Path;

use axum::extract::Multipart;
use chrono::Utc;
use tokio::fs;

use crate::error::{AppError, AppResult};
use crate::models::ProductForm;

/// Cap on non-file form fields. The image itself is only bounded by the
/// request body limit.
pub const MAX_FIELD_BYTES: usize = 10 * 1024 * 1024;

/// Read the create-product submission: text fields into a [`ProductForm`],
/// the `image` file onto disk. Returns the form and the stored filename.
pub async fn read_product_submission(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> AppResult<(ProductForm, String)> {
    let mut form = ProductForm::default();
    let mut image: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let original = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::Upload("image field carries no filename".into()))?;
            let bytes = field.bytes().await?;
            let filename = stored_filename(Utc::now().timestamp_millis(), &original);
            fs::write(upload_dir.join(&filename), &bytes).await?;
            tracing::debug!(filename = %filename, size = bytes.len(), "image stored");
            image = Some(filename);
        } else {
            let value = field.text().await?;
            if value.len() > MAX_FIELD_BYTES {
                return Err(AppError::Upload(format!(
                    "field `{name}` exceeds the {MAX_FIELD_BYTES} byte limit"
                )));
            }
            form.set(&name, value);
        }
    }

    let image = image.ok_or_else(|| AppError::Upload("missing image file".into()))?;
    Ok((form, image))
}

/// Timestamp-prefixed filename; collisions within the same millisecond are
/// accepted behavior.
pub fn stored_filename(millis: i64, original: &str) -> String {
    format!("{millis}{original}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_timestamp_prefixed() {
        assert_eq!(stored_filename(1700000000000, "cam.png"), "1700000000000cam.png");
    }
}
