use thiserror::Error;

/// Why a single field could not be read during one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no element matches `{selector}`")]
    NotFound { selector: String },

    #[error("element `{selector}` has no `{attribute}` attribute")]
    MissingAttribute { selector: String, attribute: String },

    #[error("`{selector}` matched {len} elements, wanted index {index}")]
    IndexOutOfRange {
        selector: String,
        index: usize,
        len: usize,
    },

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("page unavailable: {0}")]
    Session(String),

    #[error("field is derived after extraction")]
    Derived,
}

/// Browser session failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("browser call failed: {0}")]
    Browser(String),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failures while turning an embedded image value into a saved bitmap.
#[derive(Debug, Error)]
pub enum ImageFieldError {
    #[error("value is not an embedded PNG")]
    NotEmbedded,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failures of the recognition engine.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with {status}: {stderr}")]
    Engine { status: String, stderr: String },

    #[error("malformed engine output: {0}")]
    Malformed(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
