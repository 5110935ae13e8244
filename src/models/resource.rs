//! 手稿资源与解锁代码

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 参考站点上的手稿顺序
pub const REFERENCE_TITLES: [&str; 5] = [
    "Codex Aureus de Echternach",
    "Libro de Kells",
    "Codex Seraphinianus",
    "Necronomicon",
    "Malleus Maleficarum",
];

/// 从这个位置开始需要通过挑战服务计算代码
pub const REFERENCE_CHALLENGE_THRESHOLD: usize = 3;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 一本受保护的手稿
///
/// 在流程开始时由有序清单构造，之后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub title: String,
    pub order_index: usize,
    pub requires_challenge: bool,
    pub is_terminal: bool,
}

impl Resource {
    /// 是否需要提交代码解锁（第一本和终点都不需要）
    pub fn needs_unlock(&self) -> bool {
        self.order_index > 0 && !self.is_terminal
    }

    /// 下载文件的保存位置: `<dir>/manuscrito-<标题空白换成下划线>.pdf`
    pub fn document_path(&self, save_dir: &Path) -> PathBuf {
        let slug = WHITESPACE.replace_all(self.title.trim(), "_");
        save_dir.join(format!("manuscrito-{}.pdf", slug))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// 解锁代码，保证非空
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnlockCode(String);

impl UnlockCode {
    /// 空字符串或只有空白时返回 None
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnlockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 挑战描述: 按 targets 顺序拼接 vault 中的片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDescriptor {
    pub vault: Vec<String>,
    pub targets: Vec<usize>,
}

/// 清单中的一项（尚未确定位置）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default)]
    pub requires_challenge: bool,
}

/// 构造有序手稿列表，最后一本为终点
pub fn build_catalog(entries: Vec<CatalogEntry>) -> Result<Vec<Resource>, ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::invalid_catalog("清单为空"));
    }

    let mut seen = HashSet::new();
    for entry in &entries {
        if entry.title.trim().is_empty() {
            return Err(ConfigError::invalid_catalog("存在空标题"));
        }
        if !seen.insert(entry.title.as_str()) {
            return Err(ConfigError::invalid_catalog(format!(
                "标题重复: {}",
                entry.title
            )));
        }
    }

    let last = entries.len() - 1;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(order_index, entry)| Resource {
            title: entry.title,
            order_index,
            requires_challenge: entry.requires_challenge,
            is_terminal: order_index == last,
        })
        .collect())
}

/// 参考站点的五本手稿
pub fn reference_catalog() -> Vec<Resource> {
    let last = REFERENCE_TITLES.len() - 1;
    REFERENCE_TITLES
        .iter()
        .enumerate()
        .map(|(order_index, title)| Resource {
            title: title.to_string(),
            order_index,
            requires_challenge: order_index >= REFERENCE_CHALLENGE_THRESHOLD,
            is_terminal: order_index == last,
        })
        .collect()
}
