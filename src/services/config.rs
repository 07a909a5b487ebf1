use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::AssistantError;
use crate::settings::Settings;

/// 配置服务
///
/// 持有后端接口地址等运行期配置；`set_api_base_url` 供配置更新消息
/// 在运行中覆盖接口地址。
#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn init(&self) -> Result<(), AssistantError>;

    async fn api_base_url(&self) -> String;

    async fn set_api_base_url(&self, url: String);
}

pub struct AssistantConfigService {
    settings: Settings,
    api_base_url: RwLock<String>,
}

impl AssistantConfigService {
    pub fn new(settings: Settings) -> Self {
        let api_base_url = RwLock::new(settings.api_base_url.clone());
        Self { settings, api_base_url }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[async_trait]
impl ConfigService for AssistantConfigService {
    async fn init(&self) -> Result<(), AssistantError> {
        // 设置已在构造时载入，这里恢复为基线值，保证重复初始化的结果一致
        *self.api_base_url.write().await = self.settings.api_base_url.clone();
        debug!(api_base_url = %self.settings.api_base_url, "配置服务初始化完成");
        Ok(())
    }

    async fn api_base_url(&self) -> String {
        self.api_base_url.read().await.clone()
    }

    async fn set_api_base_url(&self, url: String) {
        info!(api_base_url = %url, "更新接口地址");
        *self.api_base_url.write().await = url;
    }
}
