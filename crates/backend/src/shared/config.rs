use contracts::domain::a001_inventory_item::LowStockThresholds;
use contracts::enums::InventoryCategory;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::retry::RetryPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Path to the sqlite file, or ":memory:" for the in-process store
    pub path: String,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.trim() == ":memory:"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    #[serde(default = "default_alert_interval_seconds")]
    pub alert_interval_seconds: u64,
    /// Keys are category codes (`it`, `food`, `office_supplies`, ...)
    #[serde(default)]
    pub thresholds: HashMap<String, u32>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            preview_count: default_preview_count(),
            ready_timeout_ms: default_ready_timeout_ms(),
            alert_interval_seconds: default_alert_interval_seconds(),
            thresholds: HashMap::new(),
        }
    }
}

impl InventoryConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Resolve threshold overrides; unknown category codes are skipped with a warning
    pub fn low_stock_thresholds(&self) -> LowStockThresholds {
        let mut overrides = HashMap::new();
        for (code, threshold) in &self.thresholds {
            match InventoryCategory::from_code(code) {
                Some(category) => {
                    overrides.insert(category, *threshold);
                }
                None => tracing::warn!("Unknown category '{}' in [inventory.thresholds]", code),
            }
        }
        LowStockThresholds::with_overrides(overrides)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl LlmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    /// OPENAI_API_KEY wins over the file value
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| Some(self.api_key.clone()).filter(|k| !k.trim().is_empty()))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Empty disables the relay transport
    #[serde(default)]
    pub relay_url: String,
    #[serde(default = "default_mail_from")]
    pub from: String,
    #[serde(default = "default_mail_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: String::new(),
            from: default_mail_from(),
            timeout_seconds: default_mail_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_preview_count() -> usize {
    3
}
fn default_ready_timeout_ms() -> u64 {
    5000
}
fn default_alert_interval_seconds() -> u64 {
    300
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_max_tokens() -> i32 {
    400
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_mail_from() -> String {
    "inventory@campus.local".into()
}
fn default_mail_timeout() -> u64 {
    10
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(db_path);
        }
    }

    PathBuf::from(&config.database.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.inventory.preview_count, 3);
        assert_eq!(config.llm.max_attempts, 3);
        assert!(config.mail.relay_url.is_empty());
    }

    #[test]
    fn test_threshold_overrides_resolve_category_codes() {
        let config = parse_config(
            r#"
            [database]
            path = ":memory:"

            [inventory.thresholds]
            food = 25
            office_supplies = 7
            stationery = 1
            "#,
        )
        .unwrap();
        assert!(config.database.is_in_memory());

        let thresholds = config.inventory.low_stock_thresholds();
        assert_eq!(thresholds.for_category(InventoryCategory::Food), 25);
        assert_eq!(thresholds.for_category(InventoryCategory::OfficeSupplies), 7);
        assert_eq!(thresholds.for_category(InventoryCategory::It), 2);
        assert_eq!(
            thresholds,
            LowStockThresholds::with_overrides(maplit::hashmap! {
                InventoryCategory::Food => 25,
                InventoryCategory::OfficeSupplies => 7,
            })
        );
    }

    #[test]
    fn test_retry_policy_never_has_zero_attempts() {
        let llm = LlmConfig {
            max_attempts: 0,
            ..LlmConfig::default()
        };
        assert_eq!(llm.retry_policy().max_attempts, 1);
    }
}
