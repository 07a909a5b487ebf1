use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// 面板显示事件
pub const EVENT_PANEL_SHOW: &str = "panel:show";
/// 面板隐藏事件
pub const EVENT_PANEL_HIDE: &str = "panel:hide";

type Callback = Box<dyn Fn(Option<&Value>) + Send + Sync>;

struct Subscriber {
    id: Uuid,
    callback: Callback,
}

/// 组件间事件总线
///
/// 订阅方注册回调，`emit` 同步通知所有订阅了该事件名的回调。
/// 订阅时返回的令牌可用于取消订阅；监听器的生命周期与页面一致，
/// 通常不需要取消。
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<String, Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅事件，返回可用于取消订阅的令牌
    pub fn subscribe<F>(&self, event: &str, callback: F) -> Uuid
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        let mut subscribers = self.subscribers.write().unwrap();
        subscribers
            .entry(event.to_string())
            .or_default()
            .push(Subscriber { id, callback: Box::new(callback) });
        id
    }

    /// 取消订阅，返回是否确实移除了一个订阅者
    pub fn unsubscribe(&self, event: &str, token: Uuid) -> bool {
        let mut subscribers = self.subscribers.write().unwrap();
        if let Some(list) = subscribers.get_mut(event) {
            let before = list.len();
            list.retain(|s| s.id != token);
            return list.len() < before;
        }
        false
    }

    /// 发布事件，同步调用所有订阅者
    pub fn emit(&self, event: &str, payload: Option<Value>) {
        let subscribers = self.subscribers.read().unwrap();
        if let Some(list) = subscribers.get(event) {
            debug!(event, count = list.len(), "Emitting event");
            for subscriber in list {
                (subscriber.callback)(payload.as_ref());
            }
        }
    }
}
