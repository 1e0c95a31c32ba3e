pub mod browser;
pub mod extractor;
pub mod loader;
pub mod merger;
pub mod traits;
pub mod types;

pub use browser::ChromeSession;
pub use extractor::{readiness_marker, FieldExtractor};
pub use loader::{PageLoader, TokioPoller};
pub use merger::AttemptMerger;
pub use traits::{PageSession, Poller};
pub use types::{PipelineSettings, ReadinessPolicy};
