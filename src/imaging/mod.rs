//! Embedded image fields: decode, enhance, persist, recognize.

pub mod enhance;

use crate::error::ImageFieldError;
use crate::models::PLACEHOLDER;
use crate::ocr::{recognize_text, RecognitionInput, RecognizedText, TextRecognizer};
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbaImage};
use regex::Regex;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub const AREA_IMAGE_DIR: &str = "area_image_base64";
pub const ADDRESS_IMAGE_DIR: &str = "address_image_base64";

static ILLEGAL_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("static regex"));

pub fn is_embedded_image(value: &str) -> bool {
    value.starts_with(PNG_DATA_URI_PREFIX)
}

pub fn decode_data_uri(value: &str) -> Result<DynamicImage, ImageFieldError> {
    let payload = value
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or(ImageFieldError::NotEmbedded)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    Ok(image::load_from_memory_with_format(&bytes, ImageFormat::Png)?)
}

/// Replace characters that are not allowed in file names with `_`.
pub fn sanitize_filename(title: &str) -> String {
    ILLEGAL_FILENAME_CHARS.replace_all(title, "_").into_owned()
}

/// File name stem for a listing's saved images.
pub fn image_stem(title: Option<&str>) -> String {
    sanitize_filename(title.filter(|t| !t.is_empty()).unwrap_or(PLACEHOLDER))
}

/// A directory of numbered images for one field category.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
    next_index: u32,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_index: 1,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save as `<n>_<stem>.png`. The counter advances before anything touches
    /// the disk, so a failed save never hands its number to the next image.
    pub async fn persist(&mut self, img: RgbaImage, stem: &str) -> Result<PathBuf, ImageFieldError> {
        let path = self.dir.join(format!("{}_{}.png", self.next_index, stem));
        self.next_index += 1;

        tokio::fs::create_dir_all(&self.dir).await?;
        let png = tokio::task::spawn_blocking(move || encode_png(&img)).await??;
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// What resolving one field produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub persisted: Option<PathBuf>,
    pub text: RecognizedText,
}

/// Turns embedded image values into recognized text.
pub struct ImageFieldResolver<'a> {
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> ImageFieldResolver<'a> {
    pub fn new(recognizer: &'a dyn TextRecognizer) -> Self {
        Self { recognizer }
    }

    /// With a `store`, the enhanced image is saved and recognition reads the
    /// saved file. Without one, recognition runs on the decoded bitmap.
    pub async fn resolve(
        &self,
        value: Option<&str>,
        store: Option<&mut ImageStore>,
        stem: &str,
    ) -> Resolution {
        let Some(value) = value.filter(|v| is_embedded_image(v)) else {
            debug!("Not an embedded image, skipping recognition");
            return Resolution::default();
        };

        let decoded = match decode_data_uri(value) {
            Ok(img) => img,
            Err(e) => {
                warn!("Failed to decode embedded image: {}", e);
                return Resolution::default();
            }
        };

        let persisted = match store {
            Some(store) => match store.persist(enhance::enhance(&decoded), stem).await {
                Ok(path) => {
                    info!("Saved {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Failed to save image into {}: {}", store.dir().display(), e);
                    None
                }
            },
            None => None,
        };

        let input = match &persisted {
            Some(path) => RecognitionInput::File(path.clone()),
            None => RecognitionInput::Image(decoded),
        };
        let text = recognize_text(self.recognizer, &input).await;

        Resolution { persisted, text }
    }
}
