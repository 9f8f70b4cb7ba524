use super::{CatalogQuery, Pagination, Product};
use crate::{Error, Result};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Point-in-time catalog summary rendered into a single chat prompt.
///
/// Category counts and the price range only cover the fetched page, not the
/// whole catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
    pub category_counts: BTreeMap<String, usize>,
    pub price_range: PriceRange,
    pub pagination: Pagination,
}

impl CatalogSnapshot {
    /// Fetches the first `page_size` products plus the category list.
    /// Any catalog failure is reported as [`Error::CatalogUnavailable`].
    pub async fn build(catalog: &dyn CatalogQuery, page_size: u32) -> Result<Self> {
        let page = catalog.fetch(1, page_size).await.map_err(|e| {
            warn!("Failed to fetch products for snapshot: {}", e);
            Error::catalog_unavailable(e.to_string())
        })?;

        let categories = catalog.list_distinct_categories().await.map_err(|e| {
            warn!("Failed to list categories for snapshot: {}", e);
            Error::catalog_unavailable(e.to_string())
        })?;

        let snapshot = Self::from_parts(page.products, categories, page.pagination);
        debug!(
            "Built catalog snapshot: {} products, {} categories, {} total items",
            snapshot.products.len(),
            snapshot.categories.len(),
            snapshot.total_items()
        );
        Ok(snapshot)
    }

    pub fn from_parts(
        products: Vec<Product>,
        categories: Vec<String>,
        pagination: Pagination,
    ) -> Self {
        let mut category_counts = BTreeMap::new();
        for product in &products {
            *category_counts.entry(product.category.clone()).or_insert(0) += 1;
        }

        let price_range = products
            .iter()
            .map(|p| p.price)
            .fold(None, |range: Option<PriceRange>, price| {
                Some(match range {
                    None => PriceRange {
                        min: price,
                        max: price,
                    },
                    Some(r) => PriceRange {
                        min: r.min.min(price),
                        max: r.max.max(price),
                    },
                })
            })
            .unwrap_or_default();

        Self {
            products,
            categories,
            category_counts,
            price_range,
            pagination,
        }
    }

    pub fn total_items(&self) -> u64 {
        self.pagination.total_items
    }

    pub fn count_for(&self, category: &str) -> usize {
        self.category_counts.get(category).copied().unwrap_or(0)
    }
}
