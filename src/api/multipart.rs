use std::collections::HashMap;

use axum::extract::Multipart;

use crate::api::errors::ApiError;

const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub(crate) struct UploadedFile {
    pub(crate) filename: Option<String>,
    pub(crate) bytes: Vec<u8>,
}

impl UploadedFile {
    pub(crate) fn text(&self) -> Result<&str, ApiError> {
        std::str::from_utf8(&self.bytes)
            .map_err(|_| ApiError::BadRequest("Uploaded file must be UTF-8 text".to_string()))
    }
}

/// Text fields plus the optional `file` part of a multipart form.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    pub(crate) fields: HashMap<String, String>,
    pub(crate) file: Option<UploadedFile>,
}

impl FormData {
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

pub(crate) async fn read_form(
    mut multipart: Multipart,
    max_file_bytes: u64,
) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == FILE_FIELD {
            let filename = field.file_name().map(str::to_string);
            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
            {
                let next_size = bytes.len() as u64 + chunk.len() as u64;
                if next_size > max_file_bytes {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "File size exceeds {}MB limit",
                        max_file_bytes / (1024 * 1024)
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            // An empty file input is submitted as a part with no name and no bytes.
            if filename.as_deref().is_some_and(|value| !value.is_empty()) || !bytes.is_empty() {
                form.file = Some(UploadedFile { filename, bytes });
            }
        } else if !name.is_empty() {
            let text = field
                .text()
                .await
                .map_err(|_| ApiError::BadRequest(format!("Invalid value for field '{name}'")))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}
