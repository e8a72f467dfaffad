//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（promptscore.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["promptscore", "promptscore.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `PROMPTSCORE_SERVICE__BASE_URL=http://grader:5000`
/// - `PROMPTSCORE_POLL__MAX_ATTEMPTS=20`
/// - `PROMPTSCORE_HISTORY__DB_PATH=/data/promptscore.sled`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("service.base_url", "http://localhost:5000")?
        .set_default("service.timeout_secs", 60)?
        .set_default("poll.initial_delay_ms", 1000)?
        .set_default("poll.interval_ms", 2000)?
        .set_default("poll.max_attempts", 30)?
        .set_default("prompt.max_chars", 500)?
        .set_default("history.db_path", "data/promptscore.sled")?
        .set_default("history.capacity", 10)?
        .set_default("log.level", "info")?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），层级分隔符为双下划线
    builder = builder.add_source(
        Environment::with_prefix("PROMPTSCORE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.service.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Service base URL cannot be empty".to_string(),
        ));
    }

    if config.poll.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "Poll max_attempts must be greater than 0".to_string(),
        ));
    }

    if config.poll.interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Poll interval cannot be 0".to_string(),
        ));
    }

    if config.prompt.max_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Prompt max_chars must be greater than 0".to_string(),
        ));
    }

    if config.history.capacity == 0 {
        return Err(ConfigError::ValidationError(
            "History capacity must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    let poll = config.poll.to_poll_config();
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Grading Service: {}", config.service.base_url);
    tracing::info!("Request Timeout: {}s", config.service.timeout_secs);
    tracing::info!(
        "Polling: first after {}ms, every {}ms, up to {} attempts ({}s budget)",
        config.poll.initial_delay_ms,
        config.poll.interval_ms,
        config.poll.max_attempts,
        poll.budget().as_secs()
    );
    tracing::info!("Prompt Max Chars: {}", config.prompt.max_chars);
    tracing::info!("History: {} (keep {})", config.history.db_path, config.history.capacity);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_base_url() {
        let mut config = AppConfig::default();
        config.service.base_url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_attempts() {
        let mut config = AppConfig::default();
        config.poll.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_capacity() {
        let mut config = AppConfig::default();
        config.history.capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promptscore.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[service]\nbase_url = \"http://grader:5000\"\n\n[poll]\ninterval_ms = 1500"
        )
        .unwrap();

        let config = load_config_from_path(Some(path.as_path())).unwrap();
        assert_eq!(config.service.base_url, "http://grader:5000");
        assert_eq!(config.poll.interval_ms, 1500);
        assert_eq!(config.poll.max_attempts, 30);
        assert_eq!(config.prompt.max_chars, 500);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config_from_path(Some(path.as_path())),
            Err(ConfigError::LoadError(_))
        ));
    }
}
