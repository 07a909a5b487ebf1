use std::sync::Arc;

pub mod api;
pub mod config;
pub mod content;
pub mod readiness;
pub mod utils;


use crate::event_bus::EventBus;
use crate::platform::PlatformRegistry;

use self::api::ApiService;
use self::config::ConfigService;
use self::content::ContentService;
use self::readiness::ModuleRegistry;
use self::utils::UtilsService;

/// 服务上下文
///
/// 显式依赖注入的容器：每个能力服务都是可选的 trait 对象，缺失用
/// `None` 表示。组合根负责装配；组件之间不读取任何全局状态。
pub struct ServiceContext {
    pub config: Option<Arc<dyn ConfigService>>,
    pub api: Option<Arc<dyn ApiService>>,
    pub utils: Option<Arc<dyn UtilsService>>,
    pub content: Option<Arc<dyn ContentService>>,
    pub platforms: Option<Arc<dyn PlatformRegistry>>,
    pub event_bus: Arc<EventBus>,
    pub modules: Arc<ModuleRegistry>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::default()
    }
}

/// 服务上下文装配器
///
/// 注入服务的同时向模块注册表发布对应的就绪信号，等待方由此得知
/// 哪些核心模块已经装配完成。
pub struct ServiceContextBuilder {
    config: Option<Arc<dyn ConfigService>>,
    api: Option<Arc<dyn ApiService>>,
    utils: Option<Arc<dyn UtilsService>>,
    content: Option<Arc<dyn ContentService>>,
    platforms: Option<Arc<dyn PlatformRegistry>>,
    modules: Arc<ModuleRegistry>,
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self {
            config: None,
            api: None,
            utils: None,
            content: None,
            platforms: None,
            modules: Arc::new(ModuleRegistry::new()),
        }
    }
}

impl ServiceContextBuilder {
    pub fn with_modules(mut self, modules: Arc<ModuleRegistry>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_config_service(mut self, service: Arc<dyn ConfigService>) -> Self {
        self.modules.mark_ready("config_service");
        self.config = Some(service);
        self
    }

    pub fn with_api_service(mut self, service: Arc<dyn ApiService>) -> Self {
        self.modules.mark_ready("api_service");
        self.api = Some(service);
        self
    }

    pub fn with_utils_service(mut self, service: Arc<dyn UtilsService>) -> Self {
        self.modules.mark_ready("utils_service");
        self.utils = Some(service);
        self
    }

    pub fn with_content_service(mut self, service: Arc<dyn ContentService>) -> Self {
        self.modules.mark_ready("content_service");
        self.content = Some(service);
        self
    }

    pub fn with_platform_registry(mut self, registry: Arc<dyn PlatformRegistry>) -> Self {
        self.modules.mark_ready("platform_registry");
        self.platforms = Some(registry);
        self
    }

    pub fn build(self) -> Arc<ServiceContext> {
        self.modules.mark_ready("event_bus");
        Arc::new(ServiceContext {
            config: self.config,
            api: self.api,
            utils: self.utils,
            content: self.content,
            platforms: self.platforms,
            event_bus: Arc::new(EventBus::new()),
            modules: self.modules,
        })
    }
}
