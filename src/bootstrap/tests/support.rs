//! 引导测试共用的测试替身
//!
//! 所有替身都只在内存中计数，不触达网络或文件系统。

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::app::AssistantApp;
use crate::errors::AssistantError;
use crate::messaging::{MessageRequest, MessageResponse};
use crate::platform::{PlatformMatch, SpecialHandling};
use crate::services::api::ApiService;
use crate::services::config::ConfigService;
use crate::services::utils::UtilsService;
use crate::settings::Settings;

/// 测试用设置：把所有等待压缩到毫秒级
pub fn test_settings() -> Settings {
    Settings {
        core_wait_timeout_ms: 200,
        default_init_delay_ms: 0,
        default_retry_delay_ms: 20,
        ..Settings::default()
    }
}

pub fn platform(id: &str, retry_on_fail: bool, retry_delay: Option<u64>) -> PlatformMatch {
    PlatformMatch {
        id: id.to_string(),
        display_name: format!("平台 {}", id),
        load_delay: None,
        special_handling: if retry_on_fail || retry_delay.is_some() {
            Some(SpecialHandling { init_delay: None, retry_on_fail, retry_delay })
        } else {
            None
        },
    }
}

/// 记录调用次数与平台状态的应用替身
pub struct RecordingApp {
    pub init_calls: AtomicUsize,
    pub detect_calls: AtomicUsize,
    initialized: AtomicBool,
    platform: RwLock<Option<PlatformMatch>>,
    detect_result: Option<PlatformMatch>,
    fail_detect: bool,
    order_log: Option<Arc<Mutex<Vec<String>>>>,
}

impl RecordingApp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            init_calls: AtomicUsize::new(0),
            detect_calls: AtomicUsize::new(0),
            initialized: AtomicBool::new(false),
            platform: RwLock::new(None),
            detect_result: None,
            fail_detect: false,
            order_log: None,
        })
    }

    pub fn with_detect_result(result: PlatformMatch) -> Arc<Self> {
        let mut app = Self::bare();
        app.detect_result = Some(result);
        Arc::new(app)
    }

    pub fn with_current_platform(platform: PlatformMatch) -> Arc<Self> {
        let app = Self::bare();
        *app.platform.write().unwrap() = Some(platform);
        Arc::new(app)
    }

    pub fn failing_detect() -> Arc<Self> {
        let mut app = Self::bare();
        app.fail_detect = true;
        Arc::new(app)
    }

    pub fn with_order_log(log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        let mut app = Self::bare();
        app.order_log = Some(log);
        Arc::new(app)
    }

    fn bare() -> Self {
        Self {
            init_calls: AtomicUsize::new(0),
            detect_calls: AtomicUsize::new(0),
            initialized: AtomicBool::new(false),
            platform: RwLock::new(None),
            detect_result: None,
            fail_detect: false,
            order_log: None,
        }
    }

    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn detect_count(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantApp for RecordingApp {
    async fn init(&self) -> Result<(), AssistantError> {
        if let Some(log) = &self.order_log {
            log.lock().unwrap().push("app".to_string());
        }
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn handle_message(
        &self,
        request: MessageRequest,
    ) -> Result<MessageResponse, AssistantError> {
        Ok(MessageResponse::ok_with("echo", serde_json::json!(request.action)))
    }

    fn current_platform(&self) -> Option<PlatformMatch> {
        self.platform.read().unwrap().clone()
    }

    async fn detect_and_load_platform(&self) -> Result<Option<PlatformMatch>, AssistantError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detect {
            return Err(AssistantError::Other("检测失败".to_string()));
        }
        *self.platform.write().unwrap() = self.detect_result.clone();
        Ok(self.detect_result.clone())
    }
}

/// 记录初始化顺序的配置服务替身
pub struct OrderedConfigService {
    log: Arc<Mutex<Vec<String>>>,
}

impl OrderedConfigService {
    pub fn new(log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { log })
    }
}

#[async_trait]
impl ConfigService for OrderedConfigService {
    async fn init(&self) -> Result<(), AssistantError> {
        self.log.lock().unwrap().push("config".to_string());
        Ok(())
    }

    async fn api_base_url(&self) -> String {
        String::new()
    }

    async fn set_api_base_url(&self, _url: String) {}
}

/// 记录初始化顺序的接口服务替身
pub struct OrderedApiService {
    log: Arc<Mutex<Vec<String>>>,
}

impl OrderedApiService {
    pub fn new(log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { log })
    }
}

#[async_trait]
impl ApiService for OrderedApiService {
    async fn init(&self) -> Result<(), AssistantError> {
        self.log.lock().unwrap().push("api".to_string());
        Ok(())
    }

    async fn post_action(
        &self,
        _action: &str,
        _payload: &serde_json::Value,
    ) -> Result<serde_json::Value, AssistantError> {
        Ok(serde_json::Value::Null)
    }
}

/// 记录初始化顺序的工具服务替身
pub struct OrderedUtilsService {
    log: Arc<Mutex<Vec<String>>>,
}

impl OrderedUtilsService {
    pub fn new(log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { log })
    }
}

impl UtilsService for OrderedUtilsService {
    fn init(&self) {
        self.log.lock().unwrap().push("utils".to_string());
    }

    fn truncate_text(&self, text: &str, _max_chars: usize) -> String {
        text.to_string()
    }

    fn word_count(&self, _text: &str) -> usize {
        0
    }
}
