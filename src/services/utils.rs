use tracing::debug;

/// 工具服务（同步初始化）
pub trait UtilsService: Send + Sync {
    fn init(&self);

    /// 按字符截断文本，超长时追加省略号
    fn truncate_text(&self, text: &str, max_chars: usize) -> String;

    /// 统计字数：CJK 字符逐字计数，其余按空白分词计数
    fn word_count(&self, text: &str) -> usize;
}

#[derive(Default)]
pub struct TextUtilsService;

impl TextUtilsService {
    pub fn new() -> Self {
        Self
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{f900}'..='\u{faff}'
        | '\u{3000}'..='\u{303f}'
        | '\u{ff00}'..='\u{ffef}')
}

impl UtilsService for TextUtilsService {
    fn init(&self) {
        debug!("工具服务初始化完成");
    }

    fn truncate_text(&self, text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push('…');
        truncated
    }

    fn word_count(&self, text: &str) -> usize {
        let cjk_count = text.chars().filter(|c| is_cjk(*c) && !c.is_whitespace()).count();
        let latin_words = text
            .split_whitespace()
            .map(|word| word.chars().filter(|c| !is_cjk(*c)).collect::<String>())
            .filter(|word| word.chars().any(|c| c.is_alphanumeric()))
            .count();
        cjk_count + latin_words
    }
}
