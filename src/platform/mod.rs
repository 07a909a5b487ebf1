use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;


/// 平台的特殊处理配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialHandling {
    /// 初始化前的额外延迟（毫秒），优先级高于 `load_delay`
    pub init_delay: Option<u64>,
    /// 首次平台检测失败后是否安排一次延迟重试
    pub retry_on_fail: bool,
    /// 延迟重试的等待时间（毫秒）
    pub retry_delay: Option<u64>,
}

/// URL 匹配到的平台记录
///
/// 由平台注册中心产出，引导控制器只读取它。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMatch {
    pub id: String,
    pub display_name: String,
    pub load_delay: Option<u64>,
    pub special_handling: Option<SpecialHandling>,
}

impl PlatformMatch {
    /// 初始化延迟：specialHandling.initDelay > loadDelay > 默认值
    pub fn init_delay_ms(&self, default_ms: u64) -> u64 {
        self.special_handling
            .as_ref()
            .and_then(|s| s.init_delay)
            .or(self.load_delay)
            .unwrap_or(default_ms)
    }

    pub fn retry_on_fail(&self) -> bool {
        self.special_handling.as_ref().map(|s| s.retry_on_fail).unwrap_or(false)
    }

    pub fn retry_delay_ms(&self, default_ms: u64) -> u64 {
        self.special_handling.as_ref().and_then(|s| s.retry_delay).unwrap_or(default_ms)
    }
}

/// 平台注册中心：根据页面 URL 返回匹配的平台（有序）
pub trait PlatformRegistry: Send + Sync {
    fn matches_for_url(&self, url: &str) -> Vec<PlatformMatch>;
}

struct PlatformEntry {
    pattern: Regex,
    platform: PlatformMatch,
}

/// 内置平台表的静态注册中心
pub struct StaticPlatformRegistry {
    entries: Vec<PlatformEntry>,
}

impl StaticPlatformRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// 内置支持的写作平台
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                r"^https?://zhuanlan\.zhihu\.com/",
                PlatformMatch {
                    id: "zhihu".to_string(),
                    display_name: "知乎专栏".to_string(),
                    load_delay: Some(800),
                    special_handling: None,
                },
            )
            .register(
                r"^https?://mp\.weixin\.qq\.com/",
                PlatformMatch {
                    id: "weixin".to_string(),
                    display_name: "微信公众号".to_string(),
                    load_delay: Some(1500),
                    // 公众号编辑器为动态加载，首次检测经常落空
                    special_handling: Some(SpecialHandling {
                        init_delay: Some(2000),
                        retry_on_fail: true,
                        retry_delay: Some(3000),
                    }),
                },
            )
            .register(
                r"^https?://www\.jianshu\.com/",
                PlatformMatch {
                    id: "jianshu".to_string(),
                    display_name: "简书".to_string(),
                    load_delay: None,
                    special_handling: None,
                },
            )
            .register(
                r"^https?://mp\.toutiao\.com/",
                PlatformMatch {
                    id: "toutiao".to_string(),
                    display_name: "今日头条".to_string(),
                    load_delay: Some(1200),
                    special_handling: None,
                },
            )
            .register(
                r"^https?://baijiahao\.baidu\.com/",
                PlatformMatch {
                    id: "baijiahao".to_string(),
                    display_name: "百家号".to_string(),
                    load_delay: Some(1000),
                    special_handling: Some(SpecialHandling {
                        init_delay: None,
                        retry_on_fail: true,
                        retry_delay: None,
                    }),
                },
            );
        registry
    }

    /// 注册一个平台；非法的正则会被忽略并记录日志
    pub fn register(&mut self, pattern: &str, platform: PlatformMatch) -> &mut Self {
        match Regex::new(pattern) {
            Ok(regex) => {
                self.entries.push(PlatformEntry { pattern: regex, platform });
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "平台 URL 模式无效，已跳过");
            }
        }
        self
    }
}

impl Default for StaticPlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformRegistry for StaticPlatformRegistry {
    fn matches_for_url(&self, url: &str) -> Vec<PlatformMatch> {
        let matches: Vec<PlatformMatch> = self
            .entries
            .iter()
            .filter(|entry| entry.pattern.is_match(url))
            .map(|entry| entry.platform.clone())
            .collect();
        debug!(url, count = matches.len(), "平台匹配完成");
        matches
    }
}
