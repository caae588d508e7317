//! Approved-products catalog abstraction
//!
//! The catalog service owns the dermatologist-approved products for each
//! taxonomy code. Implementations must be time-bounded: a slow or unreachable
//! catalog fails the request with `CatalogUnavailable`.
use crate::{error::AppResult, models::ApprovedProducts};

pub mod http;

pub use http::HttpCatalogProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Approved products per routine stage for a taxonomy code
    async fn fetch_approved(&self, code: &str) -> AppResult<ApprovedProducts>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
