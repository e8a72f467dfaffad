//! PromptScore - 医疗提示词评分客户端
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Evaluation Context: 评分维度、评估结果、评级
//! - Prompt Context: 提示词校验与草稿
//! - History Context: 评估历史与主题偏好
//!
//! 应用层 (application/):
//! - Ports: 端口定义（GradingService, EvaluationView, KeyValueStore）
//! - Pipeline: 提交 -> 轮询 -> 分类
//! - Session: 评估会话（编排器）
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP / Fake 评分客户端
//! - Persistence: Sled 存储
//! - Memory: 内存存储
//! - View: 终端渲染
//! - Events: 界面事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
