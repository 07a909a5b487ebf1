use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::errors::AssistantError;
use crate::messaging::{MessageRequest, MessageResponse};
use crate::page::PageDocument;
use crate::platform::{PlatformMatch, PlatformRegistry};
use crate::services::content::ContentService;
use crate::services::ServiceContext;

/// 核心应用对象
///
/// 引导控制器依赖的主应用接口：初始化、消息处理与平台检测。
#[async_trait]
pub trait AssistantApp: Send + Sync {
    async fn init(&self) -> Result<(), AssistantError>;

    fn is_initialized(&self) -> bool;

    async fn handle_message(
        &self,
        request: MessageRequest,
    ) -> Result<MessageResponse, AssistantError>;

    /// 当前检测到的平台；未检测到时为 None
    fn current_platform(&self) -> Option<PlatformMatch>;

    /// 重新执行平台检测并装载平台
    async fn detect_and_load_platform(&self) -> Result<Option<PlatformMatch>, AssistantError>;
}

/// 默认应用实现
///
/// 通过服务上下文完成平台检测与消息处理；没有注入平台注册中心时
/// 平台检测静默落空（软缺失）。
pub struct WenliuApp {
    ctx: Arc<ServiceContext>,
    page: Arc<PageDocument>,
    page_url: String,
    initialized: AtomicBool,
    current_platform: RwLock<Option<PlatformMatch>>,
}

impl WenliuApp {
    pub fn new(ctx: Arc<ServiceContext>, page: Arc<PageDocument>, page_url: &str) -> Self {
        Self {
            ctx,
            page,
            page_url: page_url.to_string(),
            initialized: AtomicBool::new(false),
            current_platform: RwLock::new(None),
        }
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    fn handle_get_status(&self) -> MessageResponse {
        let platform = self.current_platform().map(|p| p.display_name);
        let mut data = serde_json::Map::new();
        data.insert("initialized".to_string(), json!(self.is_initialized()));
        data.insert("platform".to_string(), json!(platform));
        MessageResponse::ok(data)
    }

    fn handle_extract_content(&self) -> Result<MessageResponse, AssistantError> {
        let content_service =
            self.ctx.content.as_ref().ok_or(AssistantError::CoreComponentMissing("content_service"))?;
        let html = self.page.source_html();
        let extracted = content_service.extract_content(&html)?;
        Ok(MessageResponse::ok_with("content", serde_json::to_value(extracted)?))
    }
}

#[async_trait]
impl AssistantApp for WenliuApp {
    async fn init(&self) -> Result<(), AssistantError> {
        self.detect_and_load_platform().await?;
        self.initialized.store(true, Ordering::SeqCst);
        info!("核心应用初始化完成");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn handle_message(
        &self,
        request: MessageRequest,
    ) -> Result<MessageResponse, AssistantError> {
        debug!(action = %request.action, "处理消息");
        match request.action.as_str() {
            "getStatus" => Ok(self.handle_get_status()),
            "getPlatform" => {
                let platform = self.current_platform();
                Ok(MessageResponse::ok_with("platform", serde_json::to_value(platform)?))
            }
            "extractContent" => self.handle_extract_content(),
            other => {
                warn!(action = other, "未知操作");
                Ok(MessageResponse::failure(format!("未知操作: {}", other)))
            }
        }
    }

    fn current_platform(&self) -> Option<PlatformMatch> {
        self.current_platform.read().unwrap().clone()
    }

    async fn detect_and_load_platform(&self) -> Result<Option<PlatformMatch>, AssistantError> {
        let Some(registry) = self.ctx.platforms.as_ref() else {
            // 平台注册中心缺失属于软缺失：跳过检测，继续运行
            debug!("平台注册中心不可用，跳过平台检测");
            return Ok(None);
        };

        let first = registry.matches_for_url(&self.page_url).into_iter().next();
        match &first {
            Some(platform) => info!(platform = %platform.display_name, "平台检测成功"),
            None => debug!(url = %self.page_url, "未匹配到支持的平台"),
        }
        *self.current_platform.write().unwrap() = first.clone();
        Ok(first)
    }
}
