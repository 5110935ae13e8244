//! 文档读取能力
//!
//! 把二进制文档拆成按页排列的文本片段。

use async_trait::async_trait;
use lopdf::Document;
use tracing::warn;

use crate::error::DocumentError;

/// 每页的文本片段，按页码升序
pub type Pages = Vec<Vec<String>>;

#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read_pages(&self, bytes: &[u8]) -> Result<Pages, DocumentError>;
}

/// 基于 lopdf 的 PDF 读取器
///
/// 每页的文本行作为该页的片段。
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfDocumentReader;

impl PdfDocumentReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentReader for PdfDocumentReader {
    async fn read_pages(&self, bytes: &[u8]) -> Result<Pages, DocumentError> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || parse_pdf(&bytes))
            .await
            .map_err(|e| DocumentError::Malformed {
                reason: format!("解析任务异常退出: {}", e),
            })?
    }
}

fn parse_pdf(bytes: &[u8]) -> Result<Pages, DocumentError> {
    let document = Document::load_mem(bytes).map_err(|e| DocumentError::Malformed {
        reason: e.to_string(),
    })?;

    // get_pages 返回 BTreeMap，天然按页码升序
    let numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    Ok(collect_pages(numbers, |n| document.extract_text(&[n])))
}

/// 逐页取文本，单页失败时该页记为空，其余页照常保留
fn collect_pages<E, F>(numbers: impl IntoIterator<Item = u32>, extract: F) -> Pages
where
    E: std::fmt::Display,
    F: Fn(u32) -> Result<String, E>,
{
    numbers
        .into_iter()
        .map(|page_number| match extract(page_number) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) => {
                warn!("⚠️ 第 {} 页文本提取失败，按空页处理: {}", page_number, e);
                Vec::new()
            }
        })
        .collect()
}
