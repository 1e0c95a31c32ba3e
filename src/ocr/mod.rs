//! Optical text recognition.
//!
//! The pipeline only depends on [`TextRecognizer`]; the Tesseract backend is
//! the default engine wired up in `main`.

mod tesseract;

pub use tesseract::TesseractRecognizer;

use crate::error::OcrError;
use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Pixel rectangle around one detected line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = (self.left + self.width).max(other.left + other.width);
        let bottom = (self.top + self.height).max(other.top + other.height);
        BoundingBox {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// One line of text found by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub text: String,
    /// Normalized to `0.0..=1.0`
    pub confidence: f32,
}

/// What to run recognition on.
#[derive(Debug, Clone)]
pub enum RecognitionInput {
    File(PathBuf),
    Image(DynamicImage),
}

/// Ordered text lines recognized in one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedText(Vec<String>);

impl RecognizedText {
    #[cfg(test)]
    pub fn new(lines: Vec<String>) -> Self {
        Self(lines)
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Detection>> for RecognizedText {
    fn from(detections: Vec<Detection>) -> Self {
        Self(detections.into_iter().map(|d| d.text).collect())
    }
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, input: &RecognitionInput) -> Result<Vec<Detection>, OcrError>;
}

/// Run recognition, treating any engine failure as "no text detected".
pub async fn recognize_text(
    recognizer: &dyn TextRecognizer,
    input: &RecognitionInput,
) -> RecognizedText {
    match recognizer.recognize(input).await {
        Ok(detections) => {
            debug!("Raw recognition result: {:?}", detections);
            if detections.is_empty() {
                debug!("No text detected");
            }
            RecognizedText::from(detections)
        }
        Err(e) => {
            warn!("Recognition failed: {}", e);
            RecognizedText::default()
        }
    }
}
