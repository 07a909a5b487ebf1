use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[cfg(test)]
mod tests;

use crate::app::AssistantApp;
use crate::errors::AssistantError;
use crate::messaging::MessageDispatcher;
use crate::page::PageDocument;
use crate::platform::PlatformRegistry;
use crate::services::api::ApiService;
use crate::services::config::ConfigService;
use crate::services::readiness::ReadinessOutcome;
use crate::services::utils::UtilsService;
use crate::services::ServiceContext;
use crate::settings::Settings;

/// 应用初始化管理器
///
/// 按固定顺序完成启动：等待核心模块 → 初始化核心服务 → 初始化应用 →
/// 安装消息处理器。整个序列单次生效，重复调用是记录警告的空操作。
/// 唯一的硬失败是应用对象缺失，它会中止序列并向调用方传播；其余
/// 缺失都以跳过、默认值或超时后继续的方式降级。
pub struct AppInitializer {
    ctx: Arc<ServiceContext>,
    app: Option<Arc<dyn AssistantApp>>,
    settings: Settings,
    state: tokio::sync::Mutex<bool>,
    initialized: AtomicBool,
    dispatcher: RwLock<Option<Arc<MessageDispatcher>>>,
}

impl AppInitializer {
    pub fn new(
        ctx: Arc<ServiceContext>,
        app: Option<Arc<dyn AssistantApp>>,
        settings: Settings,
    ) -> Self {
        if app.is_some() {
            ctx.modules.mark_ready("core_app");
        }
        Self {
            ctx,
            app,
            settings,
            state: tokio::sync::Mutex::new(false),
            initialized: AtomicBool::new(false),
            dispatcher: RwLock::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// 初始化完成后安装的消息分发器
    pub fn dispatcher(&self) -> Option<Arc<MessageDispatcher>> {
        self.dispatcher.read().unwrap().clone()
    }

    /// 等待核心模块就绪；超时不是失败，降级继续
    pub async fn wait_for_core_modules(&self, max_wait: Duration) -> ReadinessOutcome {
        self.ctx.modules.wait_for_core(max_wait).await
    }

    /// 初始化核心服务；缺失的服务静默跳过
    pub async fn init_services(&self) -> Result<(), AssistantError> {
        debug!("初始化核心服务...");

        if let Some(config) = &self.ctx.config {
            config.init().await?;
        }
        if let Some(api) = &self.ctx.api {
            api.init().await?;
        }
        if let Some(utils) = &self.ctx.utils {
            utils.init();
        }

        info!("核心服务初始化完成");
        Ok(())
    }

    /// 主初始化流程（单次生效）
    pub async fn initialize(&self) -> Result<(), AssistantError> {
        let mut state = self.state.lock().await;
        if *state {
            warn!("应用已初始化");
            return Ok(());
        }

        match self.run_init_sequence().await {
            Ok(()) => {
                *state = true;
                info!("文流助手初始化完成");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "初始化失败");
                Err(e)
            }
        }
    }

    async fn run_init_sequence(&self) -> Result<(), AssistantError> {
        info!("开始初始化文流助手...");

        // 1. 等待核心模块
        let max_wait = Duration::from_millis(self.settings.core_wait_timeout_ms);
        self.wait_for_core_modules(max_wait).await;

        // 2. 初始化核心服务
        self.init_services().await?;

        // 3. 初始化应用（缺失是唯一的硬失败）
        let app =
            self.app.clone().ok_or(AssistantError::CoreComponentMissing("core_app"))?;
        app.init().await?;
        self.initialized.store(true, Ordering::SeqCst);

        // 4. 安装消息处理器
        self.setup_message_handlers();

        Ok(())
    }

    fn setup_message_handlers(&self) {
        let dispatcher =
            Arc::new(MessageDispatcher::new(self.app.clone(), self.ctx.config.clone()));
        *self.dispatcher.write().unwrap() = Some(dispatcher);
    }

    /// 解析初始化延迟：specialHandling.initDelay > loadDelay > 默认值；
    /// 没有平台注册中心时一律使用默认值
    pub fn init_delay_for(&self, url: &str) -> Duration {
        let default_ms = self.settings.default_init_delay_ms;
        let Some(registry) = &self.ctx.platforms else {
            return Duration::from_millis(default_ms);
        };
        match registry.matches_for_url(url).first() {
            Some(platform) => Duration::from_millis(platform.init_delay_ms(default_ms)),
            None => Duration::from_millis(default_ms),
        }
    }

    /// 等待页面就绪，再按平台配置延迟，然后执行初始化
    pub async fn delayed_initialize(
        &self,
        page: &PageDocument,
        url: &str,
    ) -> Result<(), AssistantError> {
        page.wait_ready().await;

        let delay = self.init_delay_for(url);
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "延迟等待页面完全加载");
            tokio::time::sleep(delay).await;
        }

        self.initialize().await
    }

    /// 启动入口：延迟初始化，成功后按平台配置安排一次延迟重试
    pub async fn start(&self, page: &PageDocument, url: &str) -> Result<(), AssistantError> {
        self.delayed_initialize(page, url).await?;
        self.schedule_platform_retry(url);
        Ok(())
    }

    /// 安排平台延迟重试
    ///
    /// 只认第一个声明 retryOnFail 的匹配平台；重试只在应用当前仍未
    /// 检测到平台时执行，失败只记录日志，不向外传播。
    pub fn schedule_platform_retry(&self, url: &str) -> Option<JoinHandle<()>> {
        let registry = self.ctx.platforms.as_ref()?;
        let platform = registry.matches_for_url(url).into_iter().find(|p| p.retry_on_fail())?;
        let app = self.app.clone()?;

        let retry_delay =
            Duration::from_millis(platform.retry_delay_ms(self.settings.default_retry_delay_ms));
        info!(
            platform = %platform.display_name,
            delay_ms = retry_delay.as_millis() as u64,
            "安排平台延迟重试"
        );

        Some(tokio::spawn(async move {
            tokio::time::sleep(retry_delay).await;
            info!(ts=%Local::now().to_string(), platform = %platform.display_name, "平台延迟重试...");

            if app.current_platform().is_none() {
                match app.detect_and_load_platform().await {
                    Ok(_) => {
                        info!(platform = %platform.display_name, "平台延迟初始化成功");
                    }
                    Err(e) => {
                        warn!(platform = %platform.display_name, error = %e, "平台延迟初始化失败");
                    }
                }
            }
        }))
    }
}
