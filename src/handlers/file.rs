use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use bytes::Bytes;
use futures::future::join_all;

use crate::error::{ApiResponse, AppError, Result};
use crate::models::{
    CurrentUser, FileListResponse, UploadBatchResponse, UploadFailure, UploadRequest,
};
use crate::services::FileService;
use crate::AppState;

/// Upload one or more CSV files
/// POST /api/v1/files/upload
pub async fn upload_files(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut requests: Vec<UploadRequest> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidInput(format!("Failed to process multipart: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;

        requests.push(UploadRequest {
            file_name,
            content_type,
            file_size: data.len() as i64,
            data,
        });
    }

    if requests.is_empty() {
        return Err(AppError::InvalidInput("No file uploaded".to_string()));
    }

    // One independent pipeline instance per file; a failure in one does not
    // cancel or roll back the others.
    let mut outcomes = join_all(requests.into_iter().map(|req| {
        let storage = state.storage.clone();
        let metadata = state.metadata.clone();
        let owner_id = current_user.id.clone();
        async move {
            let file_name = req.file_name.clone();
            let result =
                FileService::upload_file(storage.as_ref(), metadata.as_ref(), &owner_id, req)
                    .await;
            (file_name, result)
        }
    }))
    .await;

    // A single-file request surfaces its failure as the response status.
    if outcomes.len() == 1 {
        let (_, result) = outcomes.remove(0);
        let receipt = result?;
        return Ok(Json(ApiResponse::success(receipt)).into_response());
    }

    let mut uploaded = Vec::new();
    let mut failed = Vec::new();
    for (file_name, result) in outcomes {
        match result {
            Ok(receipt) => uploaded.push(receipt),
            Err(e) => failed.push(UploadFailure {
                file_name,
                error: e.to_string(),
            }),
        }
    }

    Ok(Json(ApiResponse::success(UploadBatchResponse { uploaded, failed })).into_response())
}

/// List the caller's files, newest first
/// GET /api/v1/files
pub async fn list_files(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<FileListResponse>>> {
    let files = FileService::list_files(state.metadata.as_ref(), &current_user.id).await?;
    Ok(Json(ApiResponse::success(FileListResponse { files })))
}

/// Preview a file as decoded text
/// GET /api/v1/files/:id/view
pub async fn view_file(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response> {
    let content = FileService::read_file_text(state.storage.as_ref(), &id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, "inline")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Delete a file and its metadata record
/// DELETE /api/v1/files/:id
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    FileService::delete_file(state.storage.as_ref(), state.metadata.as_ref(), &id).await?;
    Ok(Json(ApiResponse::<()>::success_message("File deleted")))
}
