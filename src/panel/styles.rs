//! 面板的固定 DOM 标识与样式块
//!
//! 这些 id 是对外的稳定契约，外部样式与测试都依赖它们。

pub const PANEL_ID: &str = "wenliu-panel";
pub const TOGGLE_BTN_ID: &str = "wenliu-toggle-btn";
pub const STYLE_ID: &str = "wenliu-panel-styles";
pub const CLOSE_BTN_ID: &str = "wenliu-close-btn";
pub const PRESET_SELECTOR_ID: &str = "wenliu-preset-selector";
pub const CONTENT_REGION_ID: &str = "wenliu-content";

/// 面板可见状态对应的 CSS 类
pub const VISIBLE_CLASS: &str = "visible";

/// 注入页面的样式块（设计令牌 + 布局规则）
pub const PANEL_STYLES: &str = r#"
:root {
  --wenliu-primary: #667eea;
  --wenliu-success: #52c41a;
  --wenliu-error: #ff4d4f;
  --wenliu-text-primary: #2d3436;
  --wenliu-text-light: #636e72;
  --wenliu-bg-primary: #ffffff;
  --wenliu-border: #e1e8ed;
  --wenliu-shadow: 0 4px 12px rgba(0, 0, 0, 0.1);
}

#wenliu-panel {
  position: fixed;
  top: 20px;
  right: -350px;
  width: 320px;
  background: var(--wenliu-bg-primary);
  border-radius: 12px;
  box-shadow: var(--wenliu-shadow);
  z-index: 10000;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  font-size: 14px;
  transition: right 0.3s cubic-bezier(0.4, 0, 0.2, 1);
  overflow: hidden;
  border: 1px solid var(--wenliu-border);
}

#wenliu-panel.visible {
  right: 20px;
}

.wenliu-panel-header {
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  padding: 12px 16px;
  color: white;
  display: flex;
  align-items: center;
  justify-content: space-between;
}

.wenliu-header-left {
  display: flex;
  align-items: center;
  gap: 12px;
}

.wenliu-panel-title {
  font-size: 16px;
  font-weight: 600;
  margin: 0;
}

.wenliu-platform-info {
  font-size: 11px;
  opacity: 0.8;
  background: rgba(255, 255, 255, 0.15);
  padding: 2px 8px;
  border-radius: 12px;
}

.wenliu-close-btn {
  background: rgba(255, 255, 255, 0.2);
  border: none;
  color: white;
  width: 28px;
  height: 28px;
  border-radius: 50%;
  cursor: pointer;
  display: flex;
  align-items: center;
  justify-content: center;
  transition: background 0.2s;
}

.wenliu-close-btn:hover {
  background: rgba(255, 255, 255, 0.3);
}

.wenliu-panel-content {
  padding: 16px;
  max-height: 500px;
  overflow-y: auto;
}

.wenliu-preset-section {
  display: flex;
  align-items: center;
  gap: 8px;
  margin-bottom: 16px;
  padding-bottom: 12px;
  border-bottom: 1px solid #e1e8ed;
}

.wenliu-preset-label {
  font-size: 13px;
  color: #666;
  white-space: nowrap;
  margin: 0;
}

.wenliu-preset-selector {
  flex: 1;
  padding: 6px 10px;
  border: 1px solid #d9d9d9;
  border-radius: 4px;
  background: white;
  font-size: 13px;
  outline: none;
}

.wenliu-preset-selector:focus {
  border-color: #667eea;
  box-shadow: 0 0 0 2px rgba(102, 126, 234, 0.1);
}

.wenliu-status {
  text-align: center;
  padding: 20px;
  color: var(--wenliu-text-light);
}

.wenliu-status-icon {
  font-size: 32px;
  margin-bottom: 8px;
}

.wenliu-toggle-btn {
  position: fixed;
  top: 50%;
  right: 20px;
  width: 56px;
  height: 56px;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
  border: none;
  border-radius: 50%;
  color: white;
  font-size: 20px;
  cursor: pointer;
  z-index: 9999;
  box-shadow: var(--wenliu-shadow);
  transition: transform 0.3s cubic-bezier(0.4, 0, 0.2, 1), box-shadow 0.3s;
  display: flex;
  align-items: center;
  justify-content: center;
  transform: translateY(-50%);
}

.wenliu-toggle-btn:hover {
  transform: translateY(-50%) scale(1.1);
  box-shadow: 0 6px 20px rgba(102, 126, 234, 0.4);
}
"#;
