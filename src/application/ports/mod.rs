//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod grading_service;
mod key_value_store;
mod view;

pub use grading_service::{
    GradingError, GradingServicePort, PolicyRejection, RejectionOrigin, TaskId, TaskStatus,
};
pub use key_value_store::{KeyValueStorePort, StoreError};
pub use view::EvaluationViewPort;
