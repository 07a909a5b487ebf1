use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tracing::{debug, info};

pub mod styles;
pub mod view;

#[cfg(test)]
mod tests;

use crate::app::AssistantApp;
use crate::event_bus::{EventBus, EVENT_PANEL_HIDE, EVENT_PANEL_SHOW};
use crate::page::{EventKind, PageDocument, UiEvent};

use self::styles::{
    CLOSE_BTN_ID, CONTENT_REGION_ID, PANEL_ID, PANEL_STYLES, PRESET_SELECTOR_ID, STYLE_ID,
    TOGGLE_BTN_ID, VISIBLE_CLASS,
};
use self::view::Element;

const DEFAULT_LOADING_MESSAGE: &str = "加载中...";
const DEFAULT_ERROR_MESSAGE: &str = "发生了错误";

/// 功能层回调：面板只负责转发 UI 事件，具体行为在功能层实现
pub trait FeatureHandlers: Send + Sync {
    fn on_preset_selector_change(&self, event: &UiEvent);
}

/// 浮动助手面板
///
/// 持有面板的 DOM 生命周期与可见状态，对内容生产方暴露一组命令式
/// 方法。初始状态为隐藏；`destroy` 只做拆除，不是状态迁移。
pub struct WenliuPanel {
    document: Arc<PageDocument>,
    event_bus: Arc<EventBus>,
    app: Option<Arc<dyn AssistantApp>>,
    features: Option<Arc<dyn FeatureHandlers>>,
    is_visible: AtomicBool,
    styles_loaded: AtomicBool,
    panel_created: AtomicBool,
    initialized: AtomicBool,
    /// 事件监听闭包持有的自引用，避免与文档监听器互相保活
    me: Weak<WenliuPanel>,
}

impl WenliuPanel {
    pub fn new(
        document: Arc<PageDocument>,
        event_bus: Arc<EventBus>,
        app: Option<Arc<dyn AssistantApp>>,
        features: Option<Arc<dyn FeatureHandlers>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            document,
            event_bus,
            app,
            features,
            is_visible: AtomicBool::new(false),
            styles_loaded: AtomicBool::new(false),
            panel_created: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            me: me.clone(),
        })
    }

    /// 初始化面板：样式注入、节点创建、事件绑定，每个实例只执行一次
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("初始化文流面板...");
        self.load_styles();
        self.create_panel();
        self.bind_events();
        info!("文流面板初始化完成");
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible.load(Ordering::SeqCst)
    }

    /// 注入样式块；已加载或页面中已存在同 id 样式节点时不做任何事
    pub fn load_styles(&self) {
        if self.styles_loaded.load(Ordering::SeqCst) || self.document.has_style(STYLE_ID) {
            return;
        }
        self.document.append_style(STYLE_ID, PANEL_STYLES);
        self.styles_loaded.store(true, Ordering::SeqCst);
    }

    /// 创建切换按钮；先移除可能残留的同 id 按钮，防止重复注入
    pub fn create_toggle_button(&self) {
        self.document.remove_element(TOGGLE_BTN_ID);

        let toggle = Element::new("button")
            .with_id(TOGGLE_BTN_ID)
            .with_class("wenliu-toggle-btn")
            .with_attr("title", "打开文流助手")
            .with_text("字");
        self.document.append_body(toggle);
    }

    /// 创建主面板并挂到 body
    pub fn create_panel(&self) {
        self.create_toggle_button();

        let header = Element::new("div")
            .with_class("wenliu-panel-header")
            .with_child(
                Element::new("div")
                    .with_class("wenliu-header-left")
                    .with_child(
                        Element::new("h3").with_class("wenliu-panel-title").with_text("文流助手"),
                    )
                    .with_child(
                        Element::new("span")
                            .with_class("wenliu-platform-info")
                            .with_text(&self.current_platform_name()),
                    ),
            )
            .with_child(
                Element::new("button")
                    .with_id(CLOSE_BTN_ID)
                    .with_class("wenliu-close-btn")
                    .with_text("×"),
            );

        let preset_section = Element::new("div")
            .with_class("wenliu-preset-section")
            .with_child(Element::new("label").with_class("wenliu-preset-label").with_text("预设:"))
            .with_child(
                Element::new("select")
                    .with_id(PRESET_SELECTOR_ID)
                    .with_class("wenliu-preset-selector")
                    .with_child(
                        Element::new("option").with_attr("value", "none").with_text("不使用预设"),
                    ),
            );

        let panel = Element::new("div").with_id(PANEL_ID).with_child(header).with_child(
            Element::new("div")
                .with_class("wenliu-panel-content")
                .with_child(preset_section)
                .with_child(Element::new("div").with_id(CONTENT_REGION_ID)),
        );

        self.document.append_body(panel);
        self.panel_created.store(true, Ordering::SeqCst);
    }

    /// 绑定 UI 事件
    pub fn bind_events(&self) {
        // 切换按钮点击
        let weak = self.me.clone();
        self.document.add_element_listener(TOGGLE_BTN_ID, EventKind::Click, move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.toggle();
            }
        });

        // 关闭按钮点击
        let weak = self.me.clone();
        self.document.add_element_listener(CLOSE_BTN_ID, EventKind::Click, move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.hide();
            }
        });

        // 预设选择器变化
        if let Some(features) = self.features.clone() {
            self.document.add_element_listener(
                PRESET_SELECTOR_ID,
                EventKind::Change,
                move |event| {
                    features.on_preset_selector_change(event);
                },
            );
        }

        // 点击面板外部关闭 / ESC 键关闭
        let weak = self.me.clone();
        self.document.add_document_listener(move |event| {
            let Some(panel) = weak.upgrade() else {
                return;
            };
            if !panel.is_visible() {
                return;
            }
            match event {
                UiEvent::Click { target } => {
                    let inside = target.as_deref().map(|t| {
                        panel.document.is_within(t, PANEL_ID)
                            || panel.document.is_within(t, TOGGLE_BTN_ID)
                    });
                    if !inside.unwrap_or(false) {
                        panel.hide();
                    }
                }
                UiEvent::KeyDown { key } if key == "Escape" => {
                    panel.hide();
                }
                _ => {}
            }
        });
    }

    /// 显示面板并发布 `panel:show`
    pub fn show(&self) {
        if !self.panel_created.load(Ordering::SeqCst) {
            return;
        }
        self.document.add_class(PANEL_ID, VISIBLE_CLASS);
        self.is_visible.store(true, Ordering::SeqCst);
        self.event_bus.emit(EVENT_PANEL_SHOW, None);
    }

    /// 隐藏面板并发布 `panel:hide`
    pub fn hide(&self) {
        if !self.panel_created.load(Ordering::SeqCst) {
            return;
        }
        self.document.remove_class(PANEL_ID, VISIBLE_CLASS);
        self.is_visible.store(false, Ordering::SeqCst);
        self.event_bus.emit(EVENT_PANEL_HIDE, None);
    }

    pub fn toggle(&self) {
        if self.is_visible() {
            self.hide();
        } else {
            self.show();
        }
    }

    /// 当前平台显示名
    pub fn current_platform_name(&self) -> String {
        match self.app.as_ref().and_then(|app| app.current_platform()) {
            Some(platform) if !platform.display_name.is_empty() => platform.display_name,
            Some(_) => "未知平台".to_string(),
            None => "未检测到支持的平台".to_string(),
        }
    }

    /// 更新动态内容区域，预设选择器等固定 UI 保持不变
    pub fn update_content(&self, content: Vec<Element>) {
        self.document.set_children(CONTENT_REGION_ID, content);
    }

    /// 显示加载状态
    pub fn show_loading(&self, message: Option<&str>) {
        let message = message.unwrap_or(DEFAULT_LOADING_MESSAGE);
        self.update_content(vec![status_block("⏳", message)]);
    }

    /// 显示错误状态
    pub fn show_error(&self, error: Option<&str>) {
        let error = error.unwrap_or(DEFAULT_ERROR_MESSAGE);
        self.update_content(vec![status_block("❌", error)]);
    }

    /// 拆除面板：移除面板、切换按钮与样式节点；从未创建时调用也安全
    pub fn destroy(&self) {
        self.document.remove_element(PANEL_ID);
        self.document.remove_element(TOGGLE_BTN_ID);
        self.document.remove_style(STYLE_ID);
    }
}

fn status_block(icon: &str, message: &str) -> Element {
    Element::new("div")
        .with_class("wenliu-status")
        .with_child(Element::new("div").with_class("wenliu-status-icon").with_text(icon))
        .with_child(Element::new("div").with_text(message))
}
