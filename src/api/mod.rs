//! SheetBridge API Server module
//!
//! HTTP REST API for spreadsheet and document conversions.
//! Run with `sheetbridge serve` or `sheetbridge-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
