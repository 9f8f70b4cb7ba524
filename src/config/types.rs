use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Connection settings for the local text-generation server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    /// Origins allowed to call the API from a browser. Empty or `*` allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Token settings. `JWT_SECRET` in the environment takes precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
}

/// Knobs for prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_shop_name")]
    pub shop_name: String,
    #[serde(default = "default_snapshot_page_size")]
    pub snapshot_page_size: u32,
    #[serde(default = "default_max_sample_products")]
    pub max_sample_products: usize,
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// YAML list of products inserted at startup when the catalog is empty.
    #[serde(default)]
    pub seed_path: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            shop_name: default_shop_name(),
            snapshot_page_size: default_snapshot_page_size(),
            max_sample_products: default_max_sample_products(),
            currency_prefix: default_currency_prefix(),
            thousands_separator: default_thousands_separator(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_path: None,
        }
    }
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "deepseek-r1:7b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shop_name() -> String {
    "Electro Shop".to_string()
}

fn default_snapshot_page_size() -> u32 {
    10
}

fn default_max_sample_products() -> usize {
    5
}

fn default_currency_prefix() -> String {
    "Rp".to_string()
}

fn default_thousands_separator() -> char {
    '.'
}

fn default_database_path() -> String {
    "catalog.db".to_string()
}
