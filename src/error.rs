use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no file was uploaded")]
    MissingFile,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("invalid image file: {0}")]
    InvalidImage(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::Upload(_) | ApiError::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("at least one label is required")]
    NoLabels,

    #[error("label names must not be empty")]
    EmptyLabel,

    #[error("duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("image size must be greater than zero")]
    ZeroImageSize,

    #[error("image size {0} exceeds the maximum of {max}", max = crate::config::MAX_IMAGE_SIZE)]
    ImageSizeTooLarge(u32),
}
