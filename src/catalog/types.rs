use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub thumbnail: String,
    pub category: String,
    pub name: String,
    pub price: f64,
    pub image_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a product; also the record shape of seed files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub thumbnail: String,
    pub category: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image_link: String,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            thumbnail: String::new(),
            category: category.into(),
            name: name.into(),
            price,
            image_link: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
}

impl Pagination {
    pub fn new(current_page: u32, items_per_page: u32, total_items: u64) -> Self {
        let total_pages = if items_per_page == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(items_per_page)) as u32
        };

        Self {
            current_page,
            total_pages,
            total_items,
            items_per_page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}
