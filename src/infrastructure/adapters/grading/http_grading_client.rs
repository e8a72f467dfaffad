//! HTTP Grading Client - 调用外部评分 HTTP 服务
//!
//! 实现 GradingServicePort trait，通过 HTTP 调用评分服务
//!
//! 外部评分 API:
//! POST {base_url}/api/async_evaluate   {"prompt": "..."} -> {"task_id": "..."}
//! GET  {base_url}/api/task/{task_id}   -> {"status": "pending"|"completed"|"failed", "result"?, "error"?}
//!                                         或 HTTP 422 {"error": "...", "reason": "..."}
//! POST {base_url}/api/improve_prompt   {"prompt": "..."} -> {"improved": "..."}
//! GET  {base_url}/                     健康检查

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::application::ports::{
    GradingError, GradingServicePort, PolicyRejection, RejectionOrigin, TaskId, TaskStatus,
};
use crate::domain::evaluation::{coerce_int, EvaluationResult};

/// 提交与改写共用的请求体
#[derive(Debug, Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

/// HTTP 评分客户端配置
#[derive(Debug, Clone)]
pub struct HttpGradingClientConfig {
    /// 评分服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpGradingClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpGradingClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 评分客户端
pub struct HttpGradingClient {
    client: Client,
    config: HttpGradingClientConfig,
}

impl HttpGradingClient {
    /// 创建新的 HTTP 评分客户端
    pub fn new(config: HttpGradingClientConfig) -> Result<Self, GradingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GradingError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn submit_url(&self) -> String {
        format!("{}/api/async_evaluate", self.base_url())
    }

    fn task_url(&self, task_id: &TaskId) -> String {
        format!("{}/api/task/{}", self.base_url(), task_id)
    }

    fn improve_url(&self) -> String {
        format!("{}/api/improve_prompt", self.base_url())
    }

    fn health_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// POST JSON，返回成功响应的 JSON 体
    async fn post_json(&self, url: &str, prompt: &str) -> Result<Value, GradingError> {
        let response = self
            .client
            .post(url)
            .json(&PromptRequest { prompt })
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;
        if !status.is_success() {
            return Err(GradingError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| GradingError::InvalidResponse(format!("Response is not JSON: {}", e)))
    }
}

fn string_field(json: &Value, field: &str) -> Result<String, GradingError> {
    json.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GradingError::InvalidResponse(format!("Response has no '{}' field", field)))
}

#[async_trait]
impl GradingServicePort for HttpGradingClient {
    async fn submit(&self, prompt: &str) -> Result<TaskId, GradingError> {
        tracing::debug!(
            url = %self.submit_url(),
            prompt_chars = prompt.chars().count(),
            "Sending evaluation request"
        );

        let json = self.post_json(&self.submit_url(), prompt).await?;
        TaskId::parse(&string_field(&json, "task_id")?)
    }

    async fn poll(&self, task_id: &TaskId) -> Result<TaskStatus, GradingError> {
        let response = self
            .client
            .get(self.task_url(task_id))
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;

        let parsed = parse_task_response(status, &body);
        tracing::debug!(
            task_id = %task_id,
            http_status = status.as_u16(),
            task_status = parsed.as_ref().map(TaskStatus::as_str).unwrap_or("error"),
            "Task status received"
        );
        parsed
    }

    async fn improve(&self, prompt: &str) -> Result<String, GradingError> {
        tracing::debug!(url = %self.improve_url(), "Sending improve request");
        let json = self.post_json(&self.improve_url(), prompt).await?;

        // 改写失败时服务端仍返回 200，并在 error 中说明原因
        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            return Err(GradingError::InvalidResponse(format!(
                "Improve failed: {}",
                value_text(error)
            )));
        }
        string_field(&json, "improved")
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn map_request_error(e: reqwest::Error) -> GradingError {
    if e.is_timeout() {
        GradingError::Timeout
    } else if e.is_connect() {
        GradingError::NetworkError(format!("Cannot connect to grading service: {}", e))
    } else {
        GradingError::NetworkError(e.to_string())
    }
}

/// 将任务状态响应严格解析为 TaskStatus
fn parse_task_response(status: StatusCode, body: &str) -> Result<TaskStatus, GradingError> {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return Ok(TaskStatus::Rejected(parse_status_rejection(body)));
    }

    if !status.is_success() {
        // 部分服务端以 500 + {"status": "failed"} 报告任务失败
        if let Ok(json) = serde_json::from_str::<Value>(body) {
            if json.get("status").and_then(Value::as_str) == Some("failed") {
                return Ok(TaskStatus::Failed(failure_reason(&json)));
            }
        }
        return Err(GradingError::ServiceError {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let json: Value = serde_json::from_str(body)
        .map_err(|e| GradingError::InvalidResponse(format!("Response is not JSON: {}", e)))?;
    let task_status = json
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| GradingError::InvalidResponse("Response has no 'status' field".to_string()))?;

    match task_status {
        "completed" => parse_completed(&json),
        "failed" | "error" => Ok(TaskStatus::Failed(failure_reason(&json))),
        other => {
            if other != "pending" {
                tracing::debug!(status = %other, "Treating unknown task status as pending");
            }
            Ok(TaskStatus::Pending)
        }
    }
}

fn parse_completed(json: &Value) -> Result<TaskStatus, GradingError> {
    let result = json
        .get("result")
        .filter(|v| !v.is_null())
        .ok_or_else(|| GradingError::InvalidResponse("Completed task has no result".to_string()))?;

    if let Some(object) = single_object(result) {
        if object.get("error").is_some_and(|e| !e.is_null()) {
            return Ok(TaskStatus::Rejected(rejection_from(
                object,
                RejectionOrigin::EmbeddedError,
            )));
        }
    }

    EvaluationResult::from_json(result)
        .map(TaskStatus::Completed)
        .map_err(|e| GradingError::InvalidResponse(e.to_string()))
}

fn parse_status_rejection(body: &str) -> PolicyRejection {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => rejection_from(&object, RejectionOrigin::StatusCode),
        _ => PolicyRejection::new("", body.trim(), RejectionOrigin::StatusCode),
    }
}

fn rejection_from(object: &Map<String, Value>, origin: RejectionOrigin) -> PolicyRejection {
    let error_code = object.get("error").map(value_text).unwrap_or_default();
    let reason = object.get("reason").map(value_text).unwrap_or_default();

    let mut rejection = PolicyRejection::new(error_code, reason, origin);
    if let Some(score) = object.get("score").and_then(coerce_int) {
        rejection = rejection.with_score(score);
    }
    if let Some(items) = object.get("suggestions").and_then(Value::as_array) {
        rejection = rejection.with_suggestions(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        );
    }
    rejection
}

fn failure_reason(json: &Value) -> String {
    ["error", "reason"]
        .iter()
        .filter_map(|key| json.get(*key))
        .map(value_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn single_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(object) => Some(object),
        Value::Array(items) if items.len() == 1 => items[0].as_object(),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
