use thiserror::Error;

/// 助手运行时错误
///
/// 启动序列中只有 `CoreComponentMissing` 是硬失败，会中止初始化并向上传播；
/// 其余错误在消息分发层被转换为失败响应，或只记录日志后继续运行。
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("核心组件缺失: {0}")]
    CoreComponentMissing(&'static str),

    #[error("配置加载失败: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("接口请求失败: {0}")]
    Api(#[from] reqwest::Error),

    #[error("内容解析失败: {0}")]
    ContentParse(String),

    #[error("消息处理失败: {0}")]
    MessageHandling(String),

    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
