use super::{CatalogQuery, NewProduct, Pagination, Product, ProductPage};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Builder, Connection, Database, Row, Value};
use tracing::{debug, info};

pub struct CatalogStorage {
    // Kept alive for the lifetime of the connection.
    _db: Database,
    conn: Connection,
}

impl CatalogStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = Builder::new_local(db_path).build().await?;
        let conn = db.connect()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                thumbnail TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                image_link TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            (),
        )
        .await?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_products_category ON products (category)",
            (),
        )
        .await?;

        info!("Catalog database initialized: {}", db_path);
        Ok(Self { _db: db, conn })
    }

    pub async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let name = product.name.trim().to_string();
        let category = product.category.trim().to_string();

        if name.is_empty() {
            return Err(Error::invalid_product("name must not be empty"));
        }
        if product.price <= 0.0 {
            return Err(Error::invalid_product(format!(
                "price must be positive, got {}",
                product.price
            )));
        }

        let now = Utc::now();
        // Fixed-width timestamps keep lexical order equal to time order.
        let stamp = now.to_rfc3339_opts(SecondsFormat::Nanos, true);
        self.conn
            .execute(
                "INSERT INTO products (thumbnail, category, name, price, image_link, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                vec![
                    Value::from(product.thumbnail.as_str()),
                    Value::from(category.as_str()),
                    Value::from(name.as_str()),
                    Value::from(product.price),
                    Value::from(product.image_link.as_str()),
                    Value::from(stamp.as_str()),
                    Value::from(stamp.as_str()),
                ],
            )
            .await?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted product {} ({})", id, name);

        Ok(Product {
            id,
            thumbnail: product.thumbnail,
            category,
            name,
            price: product.price,
            image_link: product.image_link,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn count(&self) -> Result<u64> {
        let mut rows = self.conn.query("SELECT COUNT(*) FROM products", ()).await?;
        let total: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(total.max(0) as u64)
    }

    /// Inserts the products listed in a YAML file, but only into an empty
    /// catalog. Returns how many rows were inserted.
    pub async fn seed_from_file(&self, path: &str) -> Result<usize> {
        if self.count().await? > 0 {
            debug!("Catalog already populated, skipping seed file {}", path);
            return Ok(0);
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let products: Vec<NewProduct> = serde_yaml::from_str(&raw)?;
        let total = products.len();

        for product in products {
            self.insert_product(product).await?;
        }

        info!("Seeded catalog with {} products from {}", total, path);
        Ok(total)
    }

    fn product_from_row(row: &Row) -> Result<Product> {
        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;

        Ok(Product {
            id: row.get(0)?,
            thumbnail: row.get(1)?,
            category: row.get(2)?,
            name: row.get(3)?,
            price: row.get(4)?,
            image_link: row.get(5)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))
}

#[async_trait]
impl CatalogQuery for CatalogStorage {
    async fn fetch(&self, page: u32, page_size: u32) -> Result<ProductPage> {
        let page = page.max(1);
        let total = self.count().await?;
        let offset = i64::from(page - 1) * i64::from(page_size);

        let mut rows = self
            .conn
            .query(
                "SELECT id, thumbnail, category, name, price, image_link, created_at, updated_at \
                 FROM products ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
                vec![Value::from(i64::from(page_size)), Value::from(offset)],
            )
            .await?;

        let mut products = Vec::new();
        while let Some(row) = rows.next().await? {
            products.push(Self::product_from_row(&row)?);
        }

        debug!(
            "Fetched {} products (page {}, size {}, total {})",
            products.len(),
            page,
            page_size,
            total
        );

        Ok(ProductPage {
            products,
            pagination: Pagination::new(page, page_size, total),
        })
    }

    async fn list_distinct_categories(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT DISTINCT category FROM products ORDER BY category ASC",
                (),
            )
            .await?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(row.get::<String>(0)?);
        }

        Ok(categories)
    }
}
