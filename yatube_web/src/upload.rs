use axum::extract::{multipart::MultipartError, Multipart};
use yatube_core::forms::{ImageUpload, PostForm};

use crate::error::AppError;

/// Reads a multipart post form. An image part with no file name and no
/// bytes is a browser's empty file input and counts as "no image".
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "text" => form.text = field.text().await.map_err(bad_multipart)?,
            "group" => form.group = Some(field.text().await.map_err(bad_multipart)?),
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await.map_err(bad_multipart)?;
                if !(file_name.is_empty() && data.is_empty()) {
                    form.image = Some(ImageUpload { file_name, data });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}
