use axum::{extract::State, Extension, Json};

use crate::error::{ApiResponse, Result};
use crate::models::{CurrentUser, SweepReport};
use crate::services::MaintenanceService;
use crate::AppState;

/// Reconcile blob store contents against metadata records
/// POST /api/v1/maintenance/sweep
pub async fn sweep(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<SweepReport>>> {
    let report =
        MaintenanceService::sweep(state.storage.as_ref(), state.metadata.as_ref()).await?;
    Ok(Json(ApiResponse::success(report)))
}
