//! Grading Adapter - 评分服务客户端实现

mod fake_grading_client;
mod http_grading_client;

pub use fake_grading_client::{demo_result, FakeGradingClient, FakeGradingClientConfig};
pub use http_grading_client::{HttpGradingClient, HttpGradingClientConfig};
