use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapBoxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid page size: {width}x{height} mm")]
    InvalidPageSize { width: f32, height: f32 },
    #[error("No images selected")]
    Empty,
    #[error("Only .xlsx files can be uploaded: {0}")]
    NotXlsx(String),
    #[error("No spreadsheet has been uploaded")]
    NoUploadedTemplate,
    #[error("Template file not found: {}", .0.display())]
    TemplateMissing(PathBuf),
}

impl From<lopdf::Error> for SnapBoxError {
    fn from(e: lopdf::Error) -> Self {
        SnapBoxError::Pdf(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnapBoxError>;
