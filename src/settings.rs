use std::path::Path;

use serde::Deserialize;

use crate::errors::AssistantError;

/// 核心模块等待上限（毫秒）
pub const DEFAULT_CORE_WAIT_TIMEOUT_MS: u64 = 10_000;
/// 页面加载后的默认额外延迟（毫秒）
pub const DEFAULT_INIT_DELAY_MS: u64 = 1_000;
/// 平台延迟重试的默认延迟（毫秒）
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3_000;
/// 后端请求默认超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

/// 运行时设置
///
/// 加载顺序：内置默认值 → 可选的 `wenliu.toml` → `WENLIU_*` 环境变量覆盖。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub core_wait_timeout_ms: u64,
    pub default_init_delay_ms: u64,
    pub default_retry_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.wenliu.app".to_string(),
            core_wait_timeout_ms: DEFAULT_CORE_WAIT_TIMEOUT_MS,
            default_init_delay_ms: DEFAULT_INIT_DELAY_MS,
            default_retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// 从工作目录的 `wenliu.toml`（可缺省）和环境变量加载设置
    pub fn load() -> Result<Self, AssistantError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("wenliu").required(false))
            .add_source(config::Environment::with_prefix("WENLIU"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// 从指定配置文件加载设置
    pub fn load_from(path: &Path) -> Result<Self, AssistantError> {
        let cfg = config::Config::builder().add_source(config::File::from(path)).build()?;
        Ok(cfg.try_deserialize()?)
    }
}
