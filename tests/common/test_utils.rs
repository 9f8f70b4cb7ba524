use shop_assistant::{
    Result,
    auth::{Claims, JwtVerifier},
    catalog::{CatalogStorage, NewProduct},
    config::{AuthConfig, CatalogConfig, ChatConfig, Config, LlmConfig, LogsConfig, ServerConfig},
};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

pub const TEST_SECRET: &str = "test-secret";

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            cors_origins: Vec::new(),
        },
        llm: LlmConfig::default(),
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
        },
        chat: ChatConfig::default(),
        catalog: CatalogConfig::default(),
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn claims_expiring_at(exp: u64) -> Claims {
    Claims {
        sub: 7,
        username: "shopper".to_string(),
        is_admin: false,
        exp,
    }
}

/// A token for [`TEST_SECRET`] valid for the next hour.
pub fn valid_token() -> String {
    JwtVerifier::new(TEST_SECRET)
        .unwrap()
        .issue(&claims_expiring_at(now_secs() + 3600))
        .unwrap()
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub async fn create_test_storage(dir: &TempDir) -> Result<CatalogStorage> {
    let db_path = dir.path().join("catalog.db");
    CatalogStorage::new(&db_path.to_string_lossy()).await
}

/// Storage holding three products across two categories, inserted in order.
pub async fn create_seeded_storage(dir: &TempDir) -> Result<CatalogStorage> {
    let storage = create_test_storage(dir).await?;
    storage
        .insert_product(NewProduct::new("Galaxy A55", "Smartphone", 5_499_000.0))
        .await?;
    storage
        .insert_product(NewProduct::new("ThinkPad X1", "Laptop", 24_999_000.0))
        .await?;
    storage
        .insert_product(NewProduct::new("Redmi Note 13", "Smartphone", 2_899_000.0))
        .await?;
    Ok(storage)
}
