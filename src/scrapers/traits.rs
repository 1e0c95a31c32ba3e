use crate::error::SessionError;
use async_trait::async_trait;
use std::time::Duration;

/// A browser tab that listing pages are loaded into.
/// Implemented by headless Chrome in production and by fakes in tests.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to `url` and wait for the navigation to settle.
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Whether an element matching `selector` exists in the live DOM right now.
    async fn is_present(&self, selector: &str) -> bool;

    /// Serialized HTML of the current document.
    async fn document(&self) -> Result<String, SessionError>;
}

/// Source of waits between readiness polls and between listings.
#[async_trait]
pub trait Poller: Send + Sync {
    async fn pause(&self, duration: Duration);
}
