// ABOUTME: Error types for the upgrade deck generator
// ABOUTME: Provides structured error handling for slide construction and saving

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image {path:?}: {source}")]
    ImageReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image format: {0:?}")]
    UnsupportedImage(PathBuf),

    #[error("Failed to decode image {path:?}: {source}")]
    ImageDecodeError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Slide {0} does not exist")]
    SlideNotFound(usize),

    #[error("Shape {shape} does not exist on slide {slide}")]
    ShapeNotFound { slide: usize, shape: usize },

    #[error("Slide {slide} has no placeholder with idx {idx}")]
    PlaceholderNotFound { slide: usize, idx: u32 },

    #[error("Shape {shape} on slide {slide} has no text frame")]
    NoTextFrame { slide: usize, shape: usize },

    #[error("PPTX generation error: {0}")]
    PptxError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),
}

impl From<zip::result::ZipError> for DeckError {
    fn from(err: zip::result::ZipError) -> Self {
        DeckError::PptxError(format!("ZIP operation failed: {}", err))
    }
}

impl From<std::fmt::Error> for DeckError {
    fn from(err: std::fmt::Error) -> Self {
        DeckError::PptxError(format!("XML formatting failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
