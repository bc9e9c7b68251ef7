use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use moneta_import::{
    commit, preview, AlwaysValid, CategoryIndex, CommitRequest, ExistingTransaction,
    HeaderMapping, ImportResult, MalformedCsvError, ParsedTransaction, RowError, RowKey,
};
use moneta_storage::{get_all_categories, get_transactions_for_user, SqliteStore, StorageError};

use crate::state::AppState;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Missing user identity".to_string()),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<MalformedCsvError> for ApiError {
    fn from(e: MalformedCsvError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

// ── Request plumbing ──────────────────────────────────────────────────────────

/// The user identity is stamped by upstream auth middleware; the pipeline
/// trusts it verbatim.
fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::Unauthorized)
}

#[derive(Default)]
struct Upload {
    file: Option<String>,
    mapping: Option<HeaderMapping>,
    selection: Vec<RowKey>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Unreadable field {name}: {e}")))?;

        match name.as_str() {
            "file" => upload.file = Some(text),
            "mapping" => {
                let map: HashMap<String, String> = serde_json::from_str(&text)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid mapping: {e}")))?;
                upload.mapping = Some(HeaderMapping(map));
            }
            "selection" => {
                upload.selection = serde_json::from_str(&text)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid selection: {e}")))?;
            }
            _ => {}
        }
    }

    if upload.file.is_none() {
        return Err(ApiError::BadRequest("Missing file field".to_string()));
    }
    Ok(upload)
}

// ── Wire DTOs ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPreview {
    row: usize,
    name: String,
    date: NaiveDate,
    #[serde(rename = "amountCAD")]
    amount_cad: Option<Decimal>,
    #[serde(rename = "amountUSD")]
    amount_usd: Option<Decimal>,
    category_id: Option<i64>,
    notes: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    category_hint: Option<String>,
    category_unresolved: bool,
}

impl From<ParsedTransaction> for TransactionPreview {
    fn from(p: ParsedTransaction) -> Self {
        TransactionPreview {
            row: p.row,
            name: p.tx.name,
            date: p.tx.date,
            amount_cad: p.tx.amount_cad,
            amount_usd: p.tx.amount_usd,
            category_id: p.tx.category_id.map(|c| c.0),
            notes: p.tx.notes,
            kind: p.tx.kind.to_string(),
            category_hint: p.category_hint,
            category_unresolved: p.category_unresolved,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PreviewResponse {
    transactions: Vec<TransactionPreview>,
    errors: Vec<RowError>,
    total_count: usize,
}

#[derive(Debug, Serialize)]
struct CommitResponse {
    message: String,
    data: ImportResult,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `POST /api/import/preview` — parse and validate only; category checks use
/// the always-valid strategy and nothing is persisted.
pub async fn import_preview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError> {
    user_id(&headers)?;
    let upload = read_upload(multipart).await?;
    let rate = state.rate.current().await;

    let result = preview(
        upload.file.as_deref().unwrap_or_default(),
        upload.mapping.as_ref(),
        &AlwaysValid,
        rate,
    )?;

    let total_count = result.total();
    Ok(Json(PreviewResponse {
        transactions: result.transactions.into_iter().map(Into::into).collect(),
        errors: result.errors,
        total_count,
    }))
}

/// `POST /api/import/commit` — re-validate against current data and persist
/// row by row. A fatal persistence failure still returns the partial result,
/// under a 500.
pub async fn import_commit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let user = user_id(&headers)?;
    let upload = read_upload(multipart).await?;
    let rate = state.rate.current().await;

    let categories = get_all_categories(&state.pool).await?;
    let resolver = CategoryIndex::new(&categories);

    let existing: Vec<ExistingTransaction> = get_transactions_for_user(&state.pool, &user)
        .await?
        .into_iter()
        .map(|t| ExistingTransaction {
            id: t.id,
            date: t.date,
            name: t.name,
            amount: t.amount_cad.or(t.amount_usd),
        })
        .collect();

    let store = SqliteStore::new(state.pool.clone());
    let result = commit(
        upload.file.as_deref().unwrap_or_default(),
        upload.mapping.as_ref(),
        CommitRequest {
            user_id: &user,
            selection: &upload.selection,
            resolver: &resolver,
            cad_per_usd: rate,
            existing: &existing,
        },
        &store,
    )
    .await?;

    let (status, message) = if result.aborted.is_some() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Import aborted by a persistence failure".to_string(),
        )
    } else {
        (
            StatusCode::OK,
            format!(
                "Imported {} of {} transactions",
                result.succeeded, result.total
            ),
        )
    };

    Ok((status, Json(CommitResponse { message, data: result })).into_response())
}
