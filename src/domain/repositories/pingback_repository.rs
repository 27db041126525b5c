//! Repository trait for published targets and accepted pingbacks.

use crate::domain::entities::{NewPingback, Pingback};
use crate::error::AppError;
use async_trait::async_trait;
use url::Url;

/// Storage for the blog's published URLs and the pingbacks they received.
///
/// URLs are matched by [`crate::utils::url_normalizer::comparison_key`], so
/// a trailing slash or a fragment never makes two URLs different.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryPingbackRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PingbackRepository: Send + Sync {
    /// Returns true if `target` is a published post or page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn target_exists(&self, target: &Url) -> Result<bool, AppError>;

    /// Returns true if a pingback from `source` to `target` is already stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn pingback_exists(&self, source: &Url, target: &Url) -> Result<bool, AppError>;

    /// Stores an accepted pingback.
    ///
    /// The uniqueness of `(source_url, target_url)` is checked atomically
    /// with the insert.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the pair is already stored.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save_pingback(&self, new_pingback: NewPingback) -> Result<Pingback, AppError>;

    /// Lists stored pingbacks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Pingback>, AppError>;

    /// Counts stored pingbacks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Deletes one pingback so the same pair can be registered again.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no pingback has this id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Deletes every stored pingback and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn clear(&self) -> Result<u64, AppError>;

    /// Marks `url` as published. Returns false if it already was.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn publish_target(&self, url: &Url) -> Result<bool, AppError>;
}
