use std::sync::Arc;

use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::AssistantError;
use crate::services::utils::UtilsService;

/// 从页面中提取出的正文内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub markdown: String,
    pub word_count: usize,
}

/// 内容处理服务：从宿主页面的 HTML 中提取正文
pub trait ContentService: Send + Sync {
    fn extract_content(&self, html: &str) -> Result<ExtractedContent, AssistantError>;
}

/// 正文候选容器选择器（优先级从高到低）
const CONTENT_SELECTORS: [&str; 6] =
    ["article", ".post-content", ".article-content", "#content", "main", "body"];

pub struct ArticleContentService {
    utils: Arc<dyn UtilsService>,
}

impl ArticleContentService {
    pub fn new(utils: Arc<dyn UtilsService>) -> Self {
        Self { utils }
    }

    fn extract_title(document: &Html) -> Option<String> {
        for sel in ["h1", "title"] {
            if let Ok(selector) = Selector::parse(sel) {
                if let Some(element) = document.select(&selector).next() {
                    let text: String = element.text().collect::<String>().trim().to_string();
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }
        None
    }
}

impl ContentService for ArticleContentService {
    #[instrument(level = "debug", skip(self, html), fields(html_len = html.len()))]
    fn extract_content(&self, html: &str) -> Result<ExtractedContent, AssistantError> {
        let document = Html::parse_document(html);
        let title = Self::extract_title(&document);

        // 逐个尝试候选容器，取第一个非空的
        let mut container_html = None;
        for sel in CONTENT_SELECTORS {
            if let Ok(selector) = Selector::parse(sel) {
                if let Some(element) = document.select(&selector).next() {
                    let inner = element.inner_html();
                    if !inner.trim().is_empty() {
                        container_html = Some(inner);
                        break;
                    }
                }
            }
        }

        let container_html = container_html
            .ok_or_else(|| AssistantError::ContentParse("页面中没有可提取的正文".to_string()))?;

        let converter = HtmlToMarkdown::builder().skip_tags(vec!["script", "style"]).build();
        let markdown = converter
            .convert(&container_html)
            .map_err(|e| AssistantError::ContentParse(e.to_string()))?
            .trim()
            .to_string();

        let word_count = self.utils.word_count(&markdown);
        debug!(word_count, has_title = title.is_some(), "正文提取完成");

        Ok(ExtractedContent { title, markdown, word_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::utils::TextUtilsService;

    fn service() -> ArticleContentService {
        ArticleContentService::new(Arc::new(TextUtilsService::new()))
    }

    #[test]
    fn test_extracts_article_body_and_title() {
        let html = r#"
            <html><head><title>页面标题</title></head><body>
            <h1>文章标题</h1>
            <article><p>第一段内容。</p><p>第二段内容。</p></article>
            </body></html>
        "#;

        let content = service().extract_content(html).unwrap();
        assert_eq!(content.title.as_deref(), Some("文章标题"));
        assert!(content.markdown.contains("第一段内容"));
        assert!(content.markdown.contains("第二段内容"));
        assert!(content.word_count > 0);
    }

    #[test]
    fn test_skips_script_and_style() {
        let html = r#"
            <body><article>
            <p>正文</p>
            <script>console.log("ignored")</script>
            <style>.x { color: red }</style>
            </article></body>
        "#;

        let content = service().extract_content(html).unwrap();
        assert!(content.markdown.contains("正文"));
        assert!(!content.markdown.contains("ignored"));
        assert!(!content.markdown.contains("color"));
    }

    #[test]
    fn test_empty_page_is_an_error() {
        let err = service().extract_content("").unwrap_err();
        assert!(matches!(err, AssistantError::ContentParse(_)));
    }
}
