use crate::error::{AppError, Result};
use crate::models::UploadRequest;

pub const CSV_EXTENSION: &str = ".csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Upload size ceiling: 10 MiB.
pub const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;

/// Accept or reject an upload before any store access.
///
/// A correct extension or a correct declared content type is sufficient on
/// its own; clients routinely report one of the two wrong. No content
/// inspection happens here.
pub fn validate_upload(req: &UploadRequest) -> Result<()> {
    let name_ok = req.file_name.ends_with(CSV_EXTENSION);
    let type_ok = req.content_type.as_deref() == Some(CSV_CONTENT_TYPE);
    if !name_ok && !type_ok {
        return Err(AppError::InvalidInput(
            "Only CSV files are allowed".to_string(),
        ));
    }

    if req.file_size > MAX_FILE_SIZE {
        return Err(AppError::PayloadTooLarge(
            "File size exceeds 10MB limit".to_string(),
        ));
    }

    Ok(())
}
