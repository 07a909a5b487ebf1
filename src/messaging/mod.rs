use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};


use crate::app::AssistantApp;
use crate::services::config::ConfigService;

/// 系统尚未完成初始化时的统一失败响应文案
pub const SYSTEM_NOT_READY: &str = "系统未就绪";

/// 配置更新消息的 action 标识
pub const ACTION_CONFIG_UPDATED: &str = "configUpdated";

/// 入站消息：`{ action: string, ... }`，额外字段保留在 payload 中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub action: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl MessageRequest {
    pub fn new(action: &str) -> Self {
        Self { action: action.to_string(), payload: Map::new() }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }
}

/// 出站响应：`{ success: boolean, error?: string, ...result }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl MessageResponse {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self { success: true, error: None, data }
    }

    pub fn ok_with(key: &str, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), value);
        Self::ok(data)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), data: Map::new() }
    }
}

/// 消息分发器
///
/// 初始化完成后安装；承接宿主外壳的入站消息：通用请求委托给应用对象，
/// 配置更新消息转发给配置服务。委托过程中的任何错误或 panic 都被捕获
/// 并转换为失败响应，监听器本身永不崩溃。
pub struct MessageDispatcher {
    app: Option<Arc<dyn AssistantApp>>,
    config: Option<Arc<dyn ConfigService>>,
}

impl MessageDispatcher {
    pub fn new(app: Option<Arc<dyn AssistantApp>>, config: Option<Arc<dyn ConfigService>>) -> Self {
        Self { app, config }
    }

    /// 入站消息入口：两个监听器依次处理同一条消息
    pub async fn dispatch(&self, request: MessageRequest) -> MessageResponse {
        self.handle_config_update(&request).await;
        self.handle_request(request).await
    }

    /// 通用请求处理
    pub async fn handle_request(&self, request: MessageRequest) -> MessageResponse {
        debug!(action = %request.action, "收到外部消息");

        let app = match &self.app {
            Some(app) if app.is_initialized() => app.clone(),
            _ => return MessageResponse::failure(SYSTEM_NOT_READY),
        };

        match AssertUnwindSafe(app.handle_message(request)).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(error = %e, "消息处理失败");
                MessageResponse::failure(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic);
                error!(error = %message, "消息处理过程中发生 panic");
                MessageResponse::failure(message)
            }
        }
    }

    /// 配置更新监听器：转发 apiBaseUrl 给配置服务
    pub async fn handle_config_update(&self, request: &MessageRequest) -> bool {
        if request.action != ACTION_CONFIG_UPDATED {
            return false;
        }

        let api_base_url = request
            .payload
            .get("config")
            .and_then(|config| config.get("apiBaseUrl"))
            .and_then(|url| url.as_str());

        match (&self.config, api_base_url) {
            (Some(config), Some(url)) => {
                info!(api_base_url = %url, "配置已更新");
                config.set_api_base_url(url.to_string()).await;
                true
            }
            _ => {
                warn!("配置更新消息缺少接口地址或配置服务不可用");
                false
            }
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知错误".to_string()
    }
}
