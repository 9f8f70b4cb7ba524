mod snapshot;
mod storage;
mod types;

pub use snapshot::*;
pub use storage::CatalogStorage;
pub use types::*;

use crate::Result;
use async_trait::async_trait;

/// Read-only view of the product catalog used by the chat assistant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Fetches one page of products, newest first. `page` is 1-based.
    async fn fetch(&self, page: u32, page_size: u32) -> Result<ProductPage>;

    async fn list_distinct_categories(&self) -> Result<Vec<String>>;
}
