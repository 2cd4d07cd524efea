// API error type and its HTTP mapping

use hyper::StatusCode;
use thiserror::Error;

use crate::store::StoreError;
use crate::upload::UploadError;

/// Every way an API call can fail.
///
/// Only a missing record (404), an unusable upload (400) and an oversized
/// body (413) get their own status; everything else surfaces as a 500 whose
/// body carries the error text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidUpload(String),
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(u64),
    #[error("{0}")]
    BadInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadInput(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadInput(_) | Self::Store(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::EmptyFilename | UploadError::InvalidType => {
                Self::InvalidUpload(err.to_string())
            }
            UploadError::Io(e) => Self::Io(e),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadInput(format!("invalid JSON body: {err}"))
    }
}

impl From<multer::Error> for ApiError {
    fn from(err: multer::Error) -> Self {
        Self::BadInput(format!("invalid multipart body: {err}"))
    }
}
