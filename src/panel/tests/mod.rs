
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::AssistantApp;
use crate::errors::AssistantError;
use crate::event_bus::{EventBus, EVENT_PANEL_HIDE, EVENT_PANEL_SHOW};
use crate::messaging::{MessageRequest, MessageResponse};
use crate::page::PageDocument;
use crate::panel::WenliuPanel;
use crate::platform::PlatformMatch;

/// 订阅 panel:show / panel:hide 的事件计数器
pub struct EventCounters {
    pub shows: Arc<AtomicUsize>,
    pub hides: Arc<AtomicUsize>,
}

impl EventCounters {
    pub fn attach(bus: &EventBus) -> Self {
        let shows = Arc::new(AtomicUsize::new(0));
        let hides = Arc::new(AtomicUsize::new(0));

        let shows_clone = shows.clone();
        bus.subscribe(EVENT_PANEL_SHOW, move |_| {
            shows_clone.fetch_add(1, Ordering::SeqCst);
        });
        let hides_clone = hides.clone();
        bus.subscribe(EVENT_PANEL_HIDE, move |_| {
            hides_clone.fetch_add(1, Ordering::SeqCst);
        });

        Self { shows, hides }
    }

    pub fn shows(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }
}

/// 平台状态固定的应用替身（供面板标题栏展示使用）
pub struct StubApp {
    platform: Option<PlatformMatch>,
}

impl StubApp {
    pub fn with_platform(display_name: &str) -> Arc<Self> {
        Arc::new(Self {
            platform: Some(PlatformMatch {
                id: "stub".to_string(),
                display_name: display_name.to_string(),
                load_delay: None,
                special_handling: None,
            }),
        })
    }
}

#[async_trait]
impl AssistantApp for StubApp {
    async fn init(&self) -> Result<(), AssistantError> {
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        true
    }

    async fn handle_message(
        &self,
        _request: MessageRequest,
    ) -> Result<MessageResponse, AssistantError> {
        Ok(MessageResponse::ok(serde_json::Map::new()))
    }

    fn current_platform(&self) -> Option<PlatformMatch> {
        self.platform.clone()
    }

    async fn detect_and_load_platform(&self) -> Result<Option<PlatformMatch>, AssistantError> {
        Ok(self.platform.clone())
    }
}

pub fn make_panel() -> (Arc<PageDocument>, Arc<EventBus>, Arc<WenliuPanel>) {
    let page = Arc::new(PageDocument::new_ready());
    let bus = Arc::new(EventBus::new());
    let panel = WenliuPanel::new(page.clone(), bus.clone(), None, None);
    (page, bus, panel)
}

/// 解析 body 并统计选择器命中数
pub fn count_in_body(page: &PageDocument, selector: &str) -> usize {
    let html = page.render_body_html();
    let fragment = scraper::Html::parse_fragment(&html);
    let selector = scraper::Selector::parse(selector).unwrap();
    fragment.select(&selector).count()
}

/// 返回 body 中第一个命中选择器的元素文本
pub fn text_in_body(page: &PageDocument, selector: &str) -> Option<String> {
    let html = page.render_body_html();
    let fragment = scraper::Html::parse_fragment(&html);
    let selector = scraper::Selector::parse(selector).unwrap();
    fragment.select(&selector).next().map(|el| el.text().collect::<String>())
}
