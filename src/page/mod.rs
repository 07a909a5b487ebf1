use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tokio::sync::Notify;
use tracing::debug;

use crate::panel::view::Element;

/// 页面 UI 事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// 点击；`target` 为被点击元素的 id，点击空白处为 `None`
    Click { target: Option<String> },
    KeyDown { key: String },
    Change { target: String, value: String },
}

/// 元素级监听器的事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
}

type Listener = Box<dyn Fn(&UiEvent) + Send + Sync>;

#[derive(Default)]
struct DomState {
    /// 注入的样式块：(id, css)，保持插入顺序
    styles: Vec<(String, String)>,
    body: Vec<Element>,
    /// 宿主页面自身的原始标记（正文提取的输入）
    source_html: String,
}

#[derive(Default)]
struct ListenerState {
    document: Vec<Listener>,
    element: HashMap<(String, EventKind), Vec<Listener>>,
}

/// 宿主页面文档
///
/// 面板的挂载点：持有注入的样式块与 body 元素树，分发点击/按键事件，
/// 并提供引导序列等待的页面就绪信号。DOM 状态与监听器分开加锁，
/// 监听器回调可以安全地回写 DOM。
pub struct PageDocument {
    dom: RwLock<DomState>,
    listeners: RwLock<ListenerState>,
    ready: AtomicBool,
    ready_notify: Notify,
}

impl PageDocument {
    /// 创建一个仍在加载中的页面（需要显式 `mark_ready`）
    pub fn new() -> Self {
        Self {
            dom: RwLock::new(DomState::default()),
            listeners: RwLock::new(ListenerState::default()),
            ready: AtomicBool::new(false),
            ready_notify: Notify::new(),
        }
    }

    /// 创建一个已就绪的页面（测试与演示常用）
    pub fn new_ready() -> Self {
        let page = Self::new();
        page.ready.store(true, Ordering::SeqCst);
        page
    }

    // ---- 页面就绪 ----

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.ready_notify.notify_waiters();
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// 等待页面就绪；已就绪时立即返回
    pub async fn wait_ready(&self) {
        loop {
            let notified = self.ready_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }

    // ---- 宿主页面内容 ----

    pub fn set_source_html(&self, html: &str) {
        self.dom.write().unwrap().source_html = html.to_string();
    }

    pub fn source_html(&self) -> String {
        self.dom.read().unwrap().source_html.clone()
    }

    // ---- 样式 ----

    pub fn append_style(&self, id: &str, css: &str) {
        self.dom.write().unwrap().styles.push((id.to_string(), css.to_string()));
    }

    pub fn has_style(&self, id: &str) -> bool {
        self.style_count(id) > 0
    }

    pub fn style_count(&self, id: &str) -> usize {
        self.dom.read().unwrap().styles.iter().filter(|(style_id, _)| style_id == id).count()
    }

    pub fn remove_style(&self, id: &str) -> bool {
        let mut dom = self.dom.write().unwrap();
        let before = dom.styles.len();
        dom.styles.retain(|(style_id, _)| style_id != id);
        dom.styles.len() < before
    }

    // ---- body 元素 ----

    pub fn append_body(&self, element: Element) {
        self.dom.write().unwrap().body.push(element);
    }

    /// 递归移除 id 匹配的元素，返回是否移除了任何节点
    pub fn remove_element(&self, id: &str) -> bool {
        let mut dom = self.dom.write().unwrap();
        let before = dom.body.len();
        dom.body.retain(|el| el.id.as_deref() != Some(id));
        let mut removed = dom.body.len() < before;
        for el in dom.body.iter_mut() {
            removed |= el.remove_descendant(id);
        }
        removed
    }

    pub fn contains_element(&self, id: &str) -> bool {
        self.dom.read().unwrap().body.iter().any(|el| el.find(id).is_some())
    }

    pub fn element_has_class(&self, id: &str, class: &str) -> bool {
        let dom = self.dom.read().unwrap();
        dom.body
            .iter()
            .find_map(|el| el.find(id))
            .map(|el| el.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&self, id: &str, class: &str) -> bool {
        self.with_element_mut(id, |el| {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        })
    }

    pub fn remove_class(&self, id: &str, class: &str) -> bool {
        self.with_element_mut(id, |el| {
            el.classes.retain(|c| c != class);
        })
    }

    /// 替换元素的子树（保留元素本身及其属性）
    pub fn set_children(&self, id: &str, children: Vec<Element>) -> bool {
        self.with_element_mut(id, |el| {
            el.children = children;
        })
    }

    /// `target` 是否位于 `container` 的子树内（含 container 自身）
    pub fn is_within(&self, target_id: &str, container_id: &str) -> bool {
        let dom = self.dom.read().unwrap();
        dom.body
            .iter()
            .find_map(|el| el.find(container_id))
            .map(|container| container.find(target_id).is_some())
            .unwrap_or(false)
    }

    pub fn render_body_html(&self) -> String {
        let dom = self.dom.read().unwrap();
        dom.body.iter().map(|el| el.render()).collect::<Vec<_>>().join("")
    }

    fn with_element_mut(&self, id: &str, f: impl FnOnce(&mut Element)) -> bool {
        let mut dom = self.dom.write().unwrap();
        match dom.body.iter_mut().find_map(|el| el.find_mut(id)) {
            Some(target) => {
                f(target);
                true
            }
            None => false,
        }
    }

    // ---- 事件 ----

    /// 注册文档级监听器（点击空白处、按键等）
    pub fn add_document_listener<F>(&self, listener: F)
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        self.listeners.write().unwrap().document.push(Box::new(listener));
    }

    /// 注册元素级监听器
    pub fn add_element_listener<F>(&self, id: &str, kind: EventKind, listener: F)
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap()
            .element
            .entry((id.to_string(), kind))
            .or_default()
            .push(Box::new(listener));
    }

    /// 分发事件：先元素级监听器，再冒泡到文档级监听器
    pub fn dispatch(&self, event: UiEvent) {
        debug!(?event, "Dispatching page event");
        let listeners = self.listeners.read().unwrap();

        let element_key = match &event {
            UiEvent::Click { target: Some(target) } => Some((target.clone(), EventKind::Click)),
            UiEvent::Change { target, .. } => Some((target.clone(), EventKind::Change)),
            _ => None,
        };
        if let Some(key) = element_key {
            if let Some(list) = listeners.element.get(&key) {
                for listener in list {
                    listener(&event);
                }
            }
        }

        for listener in &listeners.document {
            listener(&event);
        }
    }

    pub fn click(&self, target: Option<&str>) {
        self.dispatch(UiEvent::Click { target: target.map(|t| t.to_string()) });
    }

    pub fn keydown(&self, key: &str) {
        self.dispatch(UiEvent::KeyDown { key: key.to_string() });
    }

    pub fn change(&self, target: &str, value: &str) {
        self.dispatch(UiEvent::Change { target: target.to_string(), value: value.to_string() });
    }
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::new()
    }
}
