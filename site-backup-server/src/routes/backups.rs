//! Backup pipeline endpoints consumed by the editor UI.
//!
//! Archives travel as raw request/response bodies; the target customer rides
//! in the `x-customer-id` header. Progress events stream out of band over
//! the UI WebSocket as `backup:progress` / `backup:completed` /
//! `backup:failed`.

use crate::error::AppError;
use crate::state::AppState;
use crate::ws::ui::UiBroadcaster;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use site_backup::executor::ExportRequest;
use site_backup::progress::TransferProgress;
use site_backup::validate_backup;
use std::sync::Arc;

pub fn router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/export", post(export_backup))
        .route("/validate", post(validate_archive))
        .route("/import", post(import_backup))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportBody {
    customer_id: String,
    description: Option<String>,
}

/// Progress sink that forwards every event to the UI socket, tagged with the
/// customer it belongs to.
fn progress_sink(ui: UiBroadcaster, customer_id: String) -> impl Fn(TransferProgress) + Send + Sync {
    move |progress: TransferProgress| {
        let mut payload = match serde_json::to_value(&progress) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return,
        };
        payload.insert("customerId".into(), json!(customer_id));
        ui.broadcast("backup:progress", serde_json::Value::Object(payload));
    }
}

async fn export_backup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExportBody>,
) -> Result<Response, AppError> {
    let customer_id = body.customer_id.clone();
    let sink = progress_sink(state.ui.clone(), customer_id.clone());

    let request = ExportRequest {
        customer_id: customer_id.clone(),
        description: body.description,
    };

    let export = match state.pipeline.export(request, &sink).await {
        Ok(export) => export,
        Err(e) => {
            state.ui.broadcast(
                "backup:failed",
                json!({ "customerId": customer_id, "error": e.to_string() }),
            );
            return Err(e.into());
        }
    };

    state.ui.broadcast(
        "backup:completed",
        json!({
            "customerId": customer_id,
            "backupId": export.manifest.backup_id,
            "filename": export.filename,
            "stats": export.manifest.stats,
        }),
    );

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.archive,
    );
    Ok(response.into_response())
}

async fn validate_archive(
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<site_backup::ValidationResult>, AppError> {
    let customer_id = customer_id_header(&headers)?;

    // Unpacking is CPU-bound; keep it off the async threads
    let result = tokio::task::spawn_blocking(move || validate_backup(&body, &customer_id))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    Ok(Json(result))
}

async fn import_backup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let customer_id = customer_id_header(&headers)?;
    let sink = progress_sink(state.ui.clone(), customer_id.clone());

    let import = match state.pipeline.import(&body, &customer_id, &sink).await {
        Ok(import) => import,
        Err(e) => {
            state.ui.broadcast(
                "backup:failed",
                json!({ "customerId": customer_id, "error": e.to_string() }),
            );
            return Err(e.into());
        }
    };

    state.ui.broadcast(
        "backup:completed",
        json!({
            "customerId": customer_id,
            "backupId": import.manifest.backup_id,
            "mediaFilesRestored": import.media_files_restored,
        }),
    );

    Ok(Json(json!({
        "success": true,
        "manifest": import.manifest,
        "mediaFilesRestored": import.media_files_restored,
        "warnings": import.warnings,
    })))
}

fn customer_id_header(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("x-customer-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("Missing x-customer-id header".into()))
}
