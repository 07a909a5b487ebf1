use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::errors::AssistantError;
use crate::services::config::ConfigService;

/// 后端接口服务
#[async_trait]
pub trait ApiService: Send + Sync {
    async fn init(&self) -> Result<(), AssistantError>;

    /// 向后端提交一个操作，返回解析后的 JSON 结果
    async fn post_action(&self, action: &str, payload: &Value) -> Result<Value, AssistantError>;
}

/// 基于 reqwest 的后端接口实现
///
/// 接口地址从配置服务读取，每次请求时解析，配置更新后无需重建客户端。
pub struct HttpApiService {
    config: Arc<dyn ConfigService>,
    client: RwLock<Option<reqwest::Client>>,
    request_timeout: Duration,
}

impl HttpApiService {
    pub fn new(config: Arc<dyn ConfigService>, request_timeout: Duration) -> Self {
        Self { config, client: RwLock::new(None), request_timeout }
    }
}

#[async_trait]
impl ApiService for HttpApiService {
    async fn init(&self) -> Result<(), AssistantError> {
        let client = reqwest::Client::builder().timeout(self.request_timeout).build()?;
        *self.client.write().await = Some(client);
        debug!(timeout_secs = self.request_timeout.as_secs(), "接口服务初始化完成");
        Ok(())
    }

    #[instrument(level = "debug", skip(self, payload), fields(action))]
    async fn post_action(&self, action: &str, payload: &Value) -> Result<Value, AssistantError> {
        let client = {
            let guard = self.client.read().await;
            guard.clone().ok_or(AssistantError::CoreComponentMissing("api_service"))?
        };

        let base_url = self.config.api_base_url().await;
        let url = format!("{}/api/{}", base_url.trim_end_matches('/'), action);

        let response = client
            .post(&url)
            .json(&serde_json::json!({ "action": action, "payload": payload }))
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<Value>().await?;
        debug!(url = %url, "接口请求成功");
        Ok(body)
    }
}
