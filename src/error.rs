use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The sheet range expression is not valid: {0}")]
    InvalidRange(String),

    #[error("{0}")]
    InvalidOrientationForRange(String),

    #[error("Unknown orientation `{0}` (expected `portrait` or `landscape`)")]
    InvalidOrientation(String),

    #[error("The following sheet doesn't exist: {0}")]
    SheetNotFound(String),

    #[error("{0}")]
    UnsupportedFile(String),

    #[error("Missing required parameter: {0}")]
    MissingField(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Whether the error was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            BridgeError::Io(_) | BridgeError::Export(_) | BridgeError::Internal(_)
        )
    }
}

impl From<calamine::XlsxError> for BridgeError {
    fn from(err: calamine::XlsxError) -> Self {
        BridgeError::Workbook(err.to_string())
    }
}

impl From<zip::result::ZipError> for BridgeError {
    fn from(err: zip::result::ZipError) -> Self {
        BridgeError::Workbook(err.to_string())
    }
}

impl From<quick_xml::Error> for BridgeError {
    fn from(err: quick_xml::Error) -> Self {
        BridgeError::Workbook(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BridgeError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        BridgeError::Export(err.to_string())
    }
}
