//! 完成检查 - 业务能力层
//!
//! 在最后一本手稿的全文中查找两条通关标记，结果只用于展示。

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static CONGRATULATIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)FELICITACIONES[,!.\s]+MAESTRO DEL SCRAPING").unwrap());

static MASTER_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)DESAF.{0,5}COMPLETADO.{0,5}NIVEL MAESTRO").unwrap());

/// 检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub found: bool,
    /// 两条标记的原文（去掉重音后）
    pub markers: Option<[String; 2]>,
}

/// NFKD 分解后去掉 U+0300..U+036F 的组合附加符号
pub fn strip_diacritics(text: &str) -> String {
    text.nfkd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// 检查全文是否包含两条通关标记
pub fn check_completion(full_text: &str) -> CompletionReport {
    let clean = strip_diacritics(full_text);
    match (CONGRATULATIONS.find(&clean), MASTER_LEVEL.find(&clean)) {
        (Some(first), Some(second)) => CompletionReport {
            found: true,
            markers: Some([first.as_str().to_string(), second.as_str().to_string()]),
        },
        _ => CompletionReport {
            found: false,
            markers: None,
        },
    }
}
