use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wenliu_lib::app::WenliuApp;
use wenliu_lib::bootstrap::AppInitializer;
use wenliu_lib::messaging::MessageRequest;
use wenliu_lib::page::PageDocument;
use wenliu_lib::panel::view::Element;
use wenliu_lib::panel::WenliuPanel;
use wenliu_lib::platform::StaticPlatformRegistry;
use wenliu_lib::services::api::HttpApiService;
use wenliu_lib::services::config::AssistantConfigService;
use wenliu_lib::services::content::ArticleContentService;
use wenliu_lib::services::utils::TextUtilsService;
use wenliu_lib::services::ServiceContext;
use wenliu_lib::settings::Settings;
use wenliu_lib::AssistantApp;

/// 演示会话使用的示例页面内容
const SAMPLE_ARTICLE: &str = r#"
<html>
<head><title>示例文章</title></head>
<body>
<h1>写作平台上的一篇文章</h1>
<article>
<p>这是正文的第一段，用于演示内容提取。</p>
<p>这是第二段，包含一些 English words 混排。</p>
</article>
</body>
</html>
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化 tracing 日志 (RUST_LOG 环境变量可覆盖，默认 info)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,wenliu=info");
    }
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_line_number(true)
        .with_thread_ids(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let settings = Settings::load()?;
    let page_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://zhuanlan.zhihu.com/p/424242".to_string());

    // 模拟的宿主页面
    let page = Arc::new(PageDocument::new());
    page.set_source_html(SAMPLE_ARTICLE);

    // 组合根：装配所有服务并注入依赖
    let utils = Arc::new(TextUtilsService::new());
    let config = Arc::new(AssistantConfigService::new(settings.clone()));
    let api = Arc::new(HttpApiService::new(
        config.clone(),
        Duration::from_secs(settings.request_timeout_secs),
    ));
    let content = Arc::new(ArticleContentService::new(utils.clone()));
    let registry = Arc::new(StaticPlatformRegistry::builtin());

    let ctx = ServiceContext::builder()
        .with_config_service(config)
        .with_api_service(api)
        .with_utils_service(utils)
        .with_content_service(content)
        .with_platform_registry(registry)
        .build();

    let app: Arc<dyn AssistantApp> =
        Arc::new(WenliuApp::new(ctx.clone(), page.clone(), &page_url));
    let initializer = AppInitializer::new(ctx.clone(), Some(app.clone()), settings);

    // 模拟页面加载完成信号
    let page_ready = page.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        page_ready.mark_ready();
    });

    if let Err(e) = initializer.start(&page, &page_url).await {
        error!(error = %e, "应用启动失败");
        return Ok(());
    }

    let panel = WenliuPanel::new(page.clone(), ctx.event_bus.clone(), Some(app.clone()), None);
    panel.init();
    panel.show_loading(None);
    panel.toggle();

    if let Some(dispatcher) = initializer.dispatcher() {
        let response = dispatcher.dispatch(MessageRequest::new("extractContent")).await;
        info!(success = response.success, "内容提取响应");

        if let Some(word_count) =
            response.data.get("content").and_then(|c| c.get("word_count")).and_then(|n| n.as_u64())
        {
            panel.update_content(vec![Element::new("div")
                .with_class("wenliu-status")
                .with_text(&format!("正文共 {} 字", word_count))]);
        }
    }

    info!(
        visible = panel.is_visible(),
        platform = %panel.current_platform_name(),
        "演示会话结束"
    );
    Ok(())
}
