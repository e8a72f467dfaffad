//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::{PollConfig, SessionConfig};
use crate::domain::evaluation::DEFAULT_SCORE_TOLERANCE;
use crate::infrastructure::adapters::HttpGradingClientConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 评分服务配置
    #[serde(default)]
    pub service: ServiceConfig,

    /// 轮询配置
    #[serde(default)]
    pub poll: PollSettings,

    /// 提示词配置
    #[serde(default)]
    pub prompt: PromptConfig,

    /// 历史记录配置
    #[serde(default)]
    pub history: HistoryConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 会话配置
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll: self.poll.to_poll_config(),
            max_chars: self.prompt.max_chars,
            history_capacity: self.history.capacity,
            score_tolerance: DEFAULT_SCORE_TOLERANCE,
        }
    }
}

/// 评分服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// 评分服务基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn client_config(&self) -> HttpGradingClientConfig {
        HttpGradingClientConfig::new(self.base_url.clone()).with_timeout(self.timeout_secs)
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    /// 首次查询前等待（毫秒）
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// 查询间隔（毫秒）
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// 最大查询次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    30
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl PollSettings {
    pub fn to_poll_config(&self) -> PollConfig {
        PollConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            interval: Duration::from_millis(self.interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// 提示词配置
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// 最大字符数
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_chars() -> usize {
    500
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

/// 历史记录配置
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Sled 数据库路径
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// 保留条数
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_db_path() -> String {
    "data/promptscore.sled".to_string()
}

fn default_capacity() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            capacity: default_capacity(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:5000");
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.prompt.max_chars, 500);
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.history.db_path, "data/promptscore.sled");
    }

    #[test]
    fn test_poll_config_conversion() {
        let poll = PollSettings::default().to_poll_config();
        assert_eq!(poll, PollConfig::default());
        assert_eq!(poll.budget(), Duration::from_secs(60));
    }

    #[test]
    fn test_session_config() {
        let mut config = AppConfig::default();
        config.prompt.max_chars = 300;
        config.poll.max_attempts = 5;

        let session = config.session_config();
        assert_eq!(session.max_chars, 300);
        assert_eq!(session.poll.max_attempts, 5);
        assert_eq!(session.history_capacity, 10);
    }
}
