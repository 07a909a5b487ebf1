//! 启动时序、平台延迟重试与默认应用的端到端测试

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::support::*;
use crate::app::WenliuApp;
use crate::bootstrap::AppInitializer;
use crate::messaging::MessageRequest;
use crate::page::PageDocument;
use crate::platform::{PlatformMatch, SpecialHandling, StaticPlatformRegistry};
use crate::services::content::ArticleContentService;
use crate::services::utils::TextUtilsService;
use crate::services::ServiceContext;
use crate::AssistantApp;

#[tokio::test]
async fn test_delayed_initialize_waits_for_page_ready() {
    let ctx = ServiceContext::builder().build();
    let app = RecordingApp::new();
    let initializer = AppInitializer::new(ctx, Some(app.clone()), test_settings());

    let page = Arc::new(PageDocument::new());
    let page_ready = page.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        page_ready.mark_ready();
    });

    let start = tokio::time::Instant::now();
    initializer.delayed_initialize(&page, "https://unknown.example/").await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(app.init_count(), 1);
}

fn retry_registry() -> Arc<StaticPlatformRegistry> {
    // 两个平台都声明 retryOnFail，延迟差异用于区分哪个生效
    let mut registry = StaticPlatformRegistry::new();
    registry
        .register(
            r"^https://multi\.example/",
            PlatformMatch {
                id: "first".to_string(),
                display_name: "第一平台".to_string(),
                load_delay: None,
                special_handling: Some(SpecialHandling {
                    init_delay: None,
                    retry_on_fail: true,
                    retry_delay: Some(30),
                }),
            },
        )
        .register(
            r"^https://multi\.example/",
            PlatformMatch {
                id: "second".to_string(),
                display_name: "第二平台".to_string(),
                load_delay: None,
                special_handling: Some(SpecialHandling {
                    init_delay: None,
                    retry_on_fail: true,
                    retry_delay: Some(10_000),
                }),
            },
        );
    Arc::new(registry)
}

#[tokio::test]
async fn test_retry_uses_first_flagged_platform() {
    let ctx = ServiceContext::builder().with_platform_registry(retry_registry()).build();
    let app = RecordingApp::with_detect_result(platform("late", false, None));
    let initializer = AppInitializer::new(ctx, Some(app.clone()), test_settings());

    let handle = initializer
        .schedule_platform_retry("https://multi.example/editor")
        .expect("应当安排重试");

    // 第一个声明 retryOnFail 的平台生效（30ms），而不是第二个（10s）
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert_eq!(app.detect_count(), 1);
    assert_eq!(app.current_platform().map(|p| p.id), Some("late".to_string()));
}

#[tokio::test]
async fn test_retry_skipped_when_platform_already_detected() {
    let ctx = ServiceContext::builder().with_platform_registry(retry_registry()).build();
    let app = RecordingApp::with_current_platform(platform("already", false, None));
    let initializer = AppInitializer::new(ctx, Some(app.clone()), test_settings());

    let handle = initializer
        .schedule_platform_retry("https://multi.example/editor")
        .expect("应当安排重试");
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

    // 平台已检测到，不再执行重试检测
    assert_eq!(app.detect_count(), 0);
}

#[tokio::test]
async fn test_retry_failure_is_logged_not_propagated() {
    let ctx = ServiceContext::builder().with_platform_registry(retry_registry()).build();
    let app = RecordingApp::failing_detect();
    let initializer = AppInitializer::new(ctx, Some(app.clone()), test_settings());

    let handle = initializer
        .schedule_platform_retry("https://multi.example/editor")
        .expect("应当安排重试");

    // 重试内部失败只记录日志，任务正常结束
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert_eq!(app.detect_count(), 1);
}

#[tokio::test]
async fn test_no_retry_without_flagged_platform() {
    let mut registry = StaticPlatformRegistry::new();
    registry.register(r"^https://calm\.example/", platform("calm", false, None));
    let ctx =
        ServiceContext::builder().with_platform_registry(Arc::new(registry)).build();
    let initializer = AppInitializer::new(ctx, Some(RecordingApp::new()), test_settings());

    assert!(initializer.schedule_platform_retry("https://calm.example/").is_none());
    assert!(initializer.schedule_platform_retry("https://nomatch.example/").is_none());
}

fn full_context() -> Arc<ServiceContext> {
    let utils = Arc::new(TextUtilsService::new());
    let content = Arc::new(ArticleContentService::new(utils.clone()));
    ServiceContext::builder()
        .with_utils_service(utils)
        .with_content_service(content)
        .with_platform_registry(Arc::new(StaticPlatformRegistry::builtin()))
        .build()
}

#[tokio::test]
async fn test_start_detects_platform_end_to_end() {
    let ctx = full_context();
    let page = Arc::new(PageDocument::new_ready());
    let app: Arc<dyn AssistantApp> = Arc::new(WenliuApp::new(
        ctx.clone(),
        page.clone(),
        "https://zhuanlan.zhihu.com/p/424242",
    ));
    let initializer = AppInitializer::new(ctx, Some(app.clone()), test_settings());

    initializer.start(&page, "https://zhuanlan.zhihu.com/p/424242").await.unwrap();

    assert!(initializer.is_initialized());
    assert!(app.is_initialized());
    assert_eq!(app.current_platform().map(|p| p.id), Some("zhihu".to_string()));
}

#[tokio::test]
async fn test_app_get_status_and_unknown_action() {
    let ctx = full_context();
    let page = Arc::new(PageDocument::new_ready());
    let app = WenliuApp::new(ctx, page, "https://www.jianshu.com/writer");
    app.init().await.unwrap();

    let status = app.handle_message(MessageRequest::new("getStatus")).await.unwrap();
    assert!(status.success);
    assert_eq!(status.data.get("initialized"), Some(&json!(true)));
    assert_eq!(status.data.get("platform"), Some(&json!("简书")));

    let unknown = app.handle_message(MessageRequest::new("doSomething")).await.unwrap();
    assert!(!unknown.success);
    assert_eq!(unknown.error.as_deref(), Some("未知操作: doSomething"));
}

#[tokio::test]
async fn test_app_extract_content_uses_page_source() {
    let ctx = full_context();
    let page = Arc::new(PageDocument::new_ready());
    page.set_source_html(
        "<html><body><h1>标题</h1><article><p>一段正文。</p></article></body></html>",
    );
    let app = WenliuApp::new(ctx, page, "https://www.jianshu.com/writer");
    app.init().await.unwrap();

    let response = app.handle_message(MessageRequest::new("extractContent")).await.unwrap();
    assert!(response.success);

    let content = response.data.get("content").expect("应包含提取结果");
    assert_eq!(content.get("title"), Some(&json!("标题")));
    assert!(content.get("markdown").unwrap().as_str().unwrap().contains("一段正文"));
}
