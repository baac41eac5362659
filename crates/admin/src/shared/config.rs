use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub data_service: DataServiceConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataServiceKind {
    /// Внешний PostgREST-совместимый сервис с хранилищем объектов
    Postgrest,
    /// Данные в памяти процесса (локальный запуск без сервиса)
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataServiceConfig {
    pub kind: DataServiceKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    pub image_bucket: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub category_page_size: usize,
    pub product_page_size: usize,
    /// Сколько категорий отдаётся в выбор категории на форме товара
    pub picker_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            category_page_size: 10,
            product_page_size: 12,
            picker_limit: 1000,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Environment variable that overrides `data_service.api_key`
pub const API_KEY_ENV: &str = "CATALOG_API_KEY";

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[data_service]
kind = "memory"
image_bucket = "product-images"
timeout_secs = 30

[pagination]
category_page_size = 10
product_page_size = 12
picker_limit = 1000
"#;

impl Config {
    /// Встроенная конфигурация (данные в памяти, порт 3000)
    pub fn embedded() -> anyhow::Result<Config> {
        Ok(toml::from_str(DEFAULT_CONFIG)?)
    }
}

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `CATALOG_API_KEY` replaces the key from the file when set.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match find_config_file() {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            read_config(&path)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            Config::embedded()?
        }
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.data_service.api_key = key;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn find_config_file() -> Option<std::path::PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let config_path = exe_path.parent()?.join("config.toml");
    if config_path.exists() {
        Some(config_path)
    } else {
        tracing::warn!("config.toml not found at: {}", config_path.display());
        None
    }
}

/// Read and parse a config file
pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

fn validate(config: &Config) -> anyhow::Result<()> {
    if config.data_service.kind == DataServiceKind::Postgrest {
        if config.data_service.url.trim().is_empty() {
            anyhow::bail!("data_service.url is required for kind = \"postgrest\"");
        }
        if config.data_service.api_key.trim().is_empty() {
            anyhow::bail!(
                "data_service.api_key (or {}) is required for kind = \"postgrest\"",
                API_KEY_ENV
            );
        }
    }
    let p = &config.pagination;
    if p.category_page_size == 0 || p.product_page_size == 0 || p.picker_limit == 0 {
        anyhow::bail!("pagination sizes must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.data_service.kind, DataServiceKind::Memory);
        assert_eq!(config.data_service.image_bucket, "product-images");
        assert_eq!(config.pagination.category_page_size, 10);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_postgrest_requires_url_and_key() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [data_service]
            kind = "postgrest"
            url = "https://example.supabase.co"
            image_bucket = "product-images"
        "#;
        let mut config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.data_service.timeout_secs, 30);
        assert_eq!(config.pagination.product_page_size, 12);
        assert!(validate(&config).is_err());

        config.data_service.api_key = "anon-key".into();
        assert!(validate(&config).is_ok());
    }
}
