//! SheetBridge API Server binary
//!
//! HTTP REST API for sheet listing, region extraction, CSV conversion and
//! document text extraction.

use clap::Parser;
use sheetbridge::api::server::DEFAULT_MAX_UPLOAD_BYTES;
use sheetbridge::api::{run_api_server, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "sheetbridge-server")]
#[command(version)]
#[command(about = "SheetBridge API Server - HTTP REST API for spreadsheet and document conversions")]
#[command(long_about = r#"
SheetBridge API Server - HTTP REST API

Endpoints (multipart/form-data uploads in a `file` part):
  - POST /api/1.0/xlsx/sheets        - List the sheets of a workbook
  - POST /api/1.0/xlsx/extract/json  - Extract a region as JSON
  - POST /api/1.0/xlsx/extract/csv   - Extract a region as CSV
  - POST /api/1.0/xlsx/from/csv      - Convert CSV to .xlsx
  - POST /api/1.0/docx/extract       - Extract the text of a .docx

Additional endpoints:
  - GET  /api/1.0/                   - Service version
  - GET  /health                     - Health check
  - GET  /version                    - Server version info

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - Configurable upload size limit
  - Tracing and structured logging (RUST_LOG)

Example usage:
  sheetbridge-server                           # Start on localhost:8080
  sheetbridge-server --host 0.0.0.0 --port 3000

  curl -F file=@book.xlsx \
    "http://localhost:8080/api/1.0/xlsx/extract/json?sheetRange=A1:C1"
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBRIDGE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETBRIDGE_PORT")]
    port: u16,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "SHEETBRIDGE_MAX_UPLOAD_BYTES")]
    max_upload_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_bytes,
    };

    run_api_server(config).await
}
