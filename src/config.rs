use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Approved-products catalog endpoint, queried by taxonomy code
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Upper bound for a single catalog request
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,

    /// Extra catalog attempts after the first failure (0 disables retries)
    #[serde(default)]
    pub catalog_max_retries: u32,

    /// TTL for cached catalog responses, only used when `redis_url` is set
    #[serde(default = "default_catalog_cache_ttl_secs")]
    pub catalog_cache_ttl_secs: u64,

    /// Redis connection URL; catalog responses are not cached when absent
    #[serde(default)]
    pub redis_url: Option<String>,

    /// JSON knowledge graph artifact
    #[serde(default = "default_knowledge_graph_path")]
    pub knowledge_graph_path: String,

    /// CSV product table used to resolve graph products to ingredients
    #[serde(default = "default_product_store_path")]
    pub product_store_path: String,

    /// When set, the product table is loaded from Postgres instead of the CSV file
    #[serde(default)]
    pub database_url: Option<String>,

    /// Postgres table holding `title` / `composition_list_standard` columns
    #[serde(default = "default_product_table")]
    pub product_table: String,

    /// Hugging Face `tokenizer.json`; the basic tokenizer is used when absent
    #[serde(default)]
    pub tokenizer_path: Option<String>,

    /// Fixed ingredient vector length
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Epochs per stage model
    #[serde(default = "default_training_epochs")]
    pub training_epochs: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// `logistic` or `centroid`
    #[serde(default = "default_ranker")]
    pub ranker: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_catalog_api_url() -> String {
    "http://localhost:8080/products_book".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    20
}

fn default_catalog_cache_ttl_secs() -> u64 {
    3600
}

fn default_knowledge_graph_path() -> String {
    "data/skincare_graph.json".to_string()
}

fn default_product_store_path() -> String {
    "data/cleaned_products.csv".to_string()
}

fn default_product_table() -> String {
    "scraped_products".to_string()
}

fn default_max_len() -> usize {
    100
}

fn default_training_epochs() -> usize {
    5
}

fn default_learning_rate() -> f64 {
    0.5
}

fn default_ranker() -> String {
    "logistic".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let vars: Vec<(String, String)> = Vec::new();
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 5001);
        assert_eq!(config.catalog_timeout(), Duration::from_secs(20));
        assert_eq!(config.catalog_max_retries, 0);
        assert_eq!(config.max_len, 100);
        assert_eq!(config.training_epochs, 5);
        assert_eq!(config.ranker, "logistic");
        assert!(config.redis_url.is_none());
        assert!(config.tokenizer_path.is_none());
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("MAX_LEN".to_string(), "32".to_string()),
            ("CATALOG_MAX_RETRIES".to_string(), "2".to_string()),
            ("REDIS_URL".to_string(), "redis://cache:6379".to_string()),
            ("RANKER".to_string(), "centroid".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.max_len, 32);
        assert_eq!(config.catalog_max_retries, 2);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.ranker, "centroid");
    }
}
