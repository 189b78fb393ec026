//! API request handlers
//!
//! Every upload endpoint takes a `multipart/form-data` body with a `file`
//! part. Other parameters come from text parts or the query string; a text
//! part wins over a query parameter of the same name.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::core::{extract, ExtractedDataset, Orientation, RangeDescriptor};
use crate::docx::extract_text;
use crate::error::{BridgeError, BridgeResult};
use crate::excel::{csv_to_xlsx, SheetEntry, XlsxDocument};
use crate::output::{to_csv, JsonEnvelope};

use super::server::AppState;

/// Operation names used in failure logs
pub const METHOD_GET_SHEETS: &str = "getSheets";
pub const METHOD_EXTRACT_XLSX: &str = "extractDataFromXLSX";
pub const METHOD_CONVERT_CSV: &str = "convertCSVToXLSX";
pub const METHOD_EXTRACT_DOCX: &str = "extractDataFromDOCX";

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ApiResponse::<()>::err(self.to_string()))).into_response()
    }
}

/// Log a failed operation and turn it into the error envelope
fn failure(method: &str, filename: Option<&str>, err: BridgeError) -> Response {
    error!(method, filename = filename.unwrap_or(""), error = %err, "Request failed");
    err.into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Info endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub version: String,
}

/// GET /api/1.0/ - Service version
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(RootResponse {
        version: state.version.clone(),
    })
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "sheets".to_string(),
            "extract-json".to_string(),
            "extract-csv".to_string(),
            "from-csv".to_string(),
            "docx-extract".to_string(),
        ],
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Uploads
// ─────────────────────────────────────────────────────────────────────────────

/// A multipart upload with its parameters
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
    params: HashMap<String, String>,
}

impl Upload {
    async fn read(query: HashMap<String, String>, mut multipart: Multipart) -> BridgeResult<Self> {
        let mut params = query;
        let mut file = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BridgeError::Request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| BridgeError::Request(e.body_text()))?;
                file = Some((file_name, bytes));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| BridgeError::Request(e.body_text()))?;
                params.insert(name, value);
            }
        }

        let (file_name, bytes) = file.ok_or_else(|| BridgeError::MissingField("file".to_string()))?;
        Ok(Self {
            file_name,
            bytes,
            params,
        })
    }

    /// A parameter value; empty values count as absent
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn require_extension(&self, extension: &str) -> BridgeResult<()> {
        if has_extension(&self.file_name, extension) {
            Ok(())
        } else {
            Err(BridgeError::UnsupportedFile(format!(
                "Only *.{} files are supported.",
                extension
            )))
        }
    }
}

fn has_extension(file_name: &str, extension: &str) -> bool {
    file_name
        .to_ascii_lowercase()
        .ends_with(&format!(".{}", extension))
}

/// Upload name without directory or extension
fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
}

/// `attachment; filename=<name>` for a requested name, else `filename=<fallback>`
fn content_disposition(requested: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    match requested {
        Some(name) => format!("attachment; filename={}", name),
        None => format!("filename={}", fallback()),
    }
}

fn generated_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Run parsing work off the async workers
async fn blocking<T, F>(work: F) -> BridgeResult<T>
where
    F: FnOnce() -> BridgeResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| BridgeError::Internal(format!("Worker task failed: {}", e)))?
}

// ─────────────────────────────────────────────────────────────────────────────
// Spreadsheet endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Sheet listing response
#[derive(Debug, Serialize)]
pub struct SheetsResponse {
    pub items: Vec<SheetEntry>,
    pub total: usize,
}

/// POST /api/1.0/xlsx/sheets - List the sheets of a workbook
pub async fn sheets(Query(query): Query<HashMap<String, String>>, multipart: Multipart) -> Response {
    let upload = match Upload::read(query, multipart).await {
        Ok(upload) => upload,
        Err(e) => return failure(METHOD_GET_SHEETS, None, e),
    };

    let result: BridgeResult<_> = async {
        upload.require_extension("xlsx")?;
        let bytes = upload.bytes.clone();
        blocking(move || Ok(XlsxDocument::from_bytes(bytes.as_ref())?.sheet_entries())).await
    }
    .await;

    match result {
        Ok(items) => Json(SheetsResponse {
            total: items.len(),
            items,
        })
        .into_response(),
        Err(e) => failure(METHOD_GET_SHEETS, Some(&upload.file_name), e),
    }
}

/// Open the uploaded workbook and extract the requested region
async fn extract_upload(upload: &Upload) -> BridgeResult<ExtractedDataset> {
    upload.require_extension("xlsx")?;

    let bytes = upload.bytes.clone();
    let sheet_name = upload.param("sheetName").map(str::to_string);
    let range = upload
        .param("sheetRange")
        .map(str::to_string)
        .ok_or_else(|| BridgeError::MissingField("sheetRange".to_string()))?;
    let orientation = upload.param("orientation").map(str::to_string);

    blocking(move || {
        let mut document = XlsxDocument::from_bytes(bytes.as_ref())?;
        let sheet = document.worksheet(sheet_name.as_deref())?;
        let range = RangeDescriptor::parse(&range)?;
        let orientation = Orientation::from_param(orientation.as_deref())?;
        extract(&sheet, &range, orientation)
    })
    .await
}

/// POST /api/1.0/xlsx/extract/json - Extract a region as JSON
pub async fn extract_json(Query(query): Query<HashMap<String, String>>, multipart: Multipart) -> Response {
    let upload = match Upload::read(query, multipart).await {
        Ok(upload) => upload,
        Err(e) => return failure(METHOD_EXTRACT_XLSX, None, e),
    };

    match extract_upload(&upload).await {
        Ok(dataset) => {
            let envelope = JsonEnvelope::new(dataset);
            debug!(rows = envelope.rows, cols = envelope.cols, "Extracted region as JSON");
            let disposition = content_disposition(upload.param("filename"), || generated_name("json"));
            ([(header::CONTENT_DISPOSITION, disposition)], Json(envelope)).into_response()
        }
        Err(e) => failure(METHOD_EXTRACT_XLSX, Some(&upload.file_name), e),
    }
}

/// POST /api/1.0/xlsx/extract/csv - Extract a region as CSV
pub async fn extract_csv(Query(query): Query<HashMap<String, String>>, multipart: Multipart) -> Response {
    let upload = match Upload::read(query, multipart).await {
        Ok(upload) => upload,
        Err(e) => return failure(METHOD_EXTRACT_XLSX, None, e),
    };

    match extract_upload(&upload).await {
        Ok(dataset) => {
            debug!(rows = dataset.row_count(), cols = dataset.col_count(), "Extracted region as CSV");
            let disposition = content_disposition(upload.param("filename"), || generated_name("csv"));
            (
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                to_csv(&dataset),
            )
                .into_response()
        }
        Err(e) => failure(METHOD_EXTRACT_XLSX, Some(&upload.file_name), e),
    }
}

/// POST /api/1.0/xlsx/from/csv - Convert a CSV file to a workbook
pub async fn from_csv(Query(query): Query<HashMap<String, String>>, multipart: Multipart) -> Response {
    let upload = match Upload::read(query, multipart).await {
        Ok(upload) => upload,
        Err(e) => return failure(METHOD_CONVERT_CSV, None, e),
    };

    let result: BridgeResult<_> = async {
        upload.require_extension("csv")?;
        let bytes = upload.bytes.clone();
        let sheet_name = base_name(&upload.file_name).to_string();
        blocking(move || csv_to_xlsx(&bytes, &sheet_name)).await
    }
    .await;

    match result {
        Ok(workbook) => {
            let stem = base_name(&upload.file_name);
            let disposition = content_disposition(upload.param("filename"), || format!("{}.xlsx", stem));
            (
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                workbook,
            )
                .into_response()
        }
        Err(e) => failure(METHOD_CONVERT_CSV, Some(&upload.file_name), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/1.0/docx/extract - Extract the text of a Word document
pub async fn docx_extract(Query(query): Query<HashMap<String, String>>, multipart: Multipart) -> Response {
    let upload = match Upload::read(query, multipart).await {
        Ok(upload) => upload,
        Err(e) => return failure(METHOD_EXTRACT_DOCX, None, e),
    };

    let result: BridgeResult<_> = async {
        upload.require_extension("docx")?;
        let bytes = upload.bytes.clone();
        blocking(move || extract_text(&bytes)).await
    }
    .await;

    match result {
        Ok(text) => {
            let disposition = content_disposition(upload.param("filename"), || generated_name("txt"));
            (
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                text,
            )
                .into_response()
        }
        Err(e) => failure(METHOD_EXTRACT_DOCX, Some(&upload.file_name), e),
    }
}
