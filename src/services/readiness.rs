use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// 核心模块列表（按依赖顺序）
pub const CORE_MODULES: [&str; 7] = [
    "event_bus",
    "config_service",
    "api_service",
    "utils_service",
    "content_service",
    "platform_registry",
    "core_app",
];

/// 核心模块等待结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// 所有必需模块在期限内就绪
    Ready,
    /// 等待超时，`missing` 为仍然缺失的模块（按依赖顺序）
    ///
    /// 超时不是错误：调用方以降级模式继续运行。
    TimedOut { missing: Vec<String> },
}

/// 模块就绪注册表
///
/// 每个模块在装配完成时调用 `mark_ready` 发布就绪信号，等待方通过
/// `wait_for_core` 将"全部就绪"信号与期限竞速。就绪集合只增不减，
/// 重复标记是幂等的。
pub struct ModuleRegistry {
    required: Vec<&'static str>,
    ready: Mutex<HashSet<String>>,
    notify: Notify,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::with_required(CORE_MODULES.to_vec())
    }

    pub fn with_required(required: Vec<&'static str>) -> Self {
        Self { required, ready: Mutex::new(HashSet::new()), notify: Notify::new() }
    }

    /// 标记模块就绪并唤醒等待方
    pub fn mark_ready(&self, name: &str) {
        let inserted = self.ready.lock().unwrap().insert(name.to_string());
        if inserted {
            debug!(module = name, "Module ready");
            self.notify.notify_waiters();
        }
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.ready.lock().unwrap().contains(name)
    }

    /// 仍然缺失的必需模块，按依赖顺序返回
    pub fn missing(&self) -> Vec<String> {
        let ready = self.ready.lock().unwrap();
        self.required.iter().filter(|name| !ready.contains(**name)).map(|s| s.to_string()).collect()
    }

    /// 等待所有核心模块就绪
    ///
    /// 全部就绪时立即返回；到达期限时同样返回（降级模式继续），
    /// 并记录缺失的模块。
    pub async fn wait_for_core(&self, max_wait: Duration) -> ReadinessOutcome {
        debug!("等待核心模块就绪...");
        let deadline = tokio::time::Instant::now() + max_wait;

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // 先注册唤醒兴趣再检查，避免信号在检查与等待之间丢失
            notified.as_mut().enable();

            if self.missing().is_empty() {
                info!("核心模块全部就绪");
                return ReadinessOutcome::Ready;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                let missing = self.missing();
                warn!(?missing, "核心模块等待超时，以降级模式继续");
                return ReadinessOutcome::TimedOut { missing };
            }
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
