//! 文本提取服务 - 业务能力层
//!
//! 文档字节 → 纯文本 → 解锁代码

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::DocumentError;
use crate::infrastructure::DocumentReader;
use crate::models::UnlockCode;

static ACCESS_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)acceso:\s*([A-Z0-9]+)").unwrap());

/// 从文本中提取第一个 `acceso: XXXX` 代码
pub fn extract_code(text: &str) -> Option<UnlockCode> {
    ACCESS_CODE
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| UnlockCode::new(m.as_str()))
}

/// 每页片段以空格连接，页末追加换行，页序保持不变
pub fn join_pages(pages: &[Vec<String>]) -> String {
    let mut text = String::new();
    for fragments in pages {
        text.push_str(&fragments.join(" "));
        text.push('\n');
    }
    text
}

/// 文本提取服务
///
/// 文档缺失或无法解析时只记录警告并返回 None，由流程决定是否致命。
#[derive(Clone)]
pub struct TextExtractor {
    reader: Arc<dyn DocumentReader>,
}

impl TextExtractor {
    pub fn new(reader: Arc<dyn DocumentReader>) -> Self {
        Self { reader }
    }

    /// 多页文档 → 单个字符串
    pub async fn extract_full_text(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        let pages = self.reader.read_pages(bytes).await?;
        debug!("文档共 {} 页", pages.len());
        Ok(join_pages(&pages))
    }

    async fn load_text(&self, path: &Path) -> Result<String, DocumentError> {
        if fs::metadata(path).await.is_err() {
            return Err(DocumentError::Unavailable {
                path: path.display().to_string(),
            });
        }
        let bytes = fs::read(path)
            .await
            .map_err(|source| DocumentError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        self.extract_full_text(&bytes).await
    }

    /// 读取本地文档全文
    pub async fn read_text(&self, path: &Path) -> Option<String> {
        match self.load_text(path).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("⚠️ {}", e);
                None
            }
        }
    }

    /// 读取本地文档并提取解锁代码
    pub async fn read_code(&self, path: &Path) -> Option<UnlockCode> {
        let text = self.read_text(path).await?;
        match extract_code(&text) {
            Some(code) => {
                info!("🔑 提取到代码: {}", code);
                Some(code)
            }
            None => {
                warn!("⚠️ 文档中没有找到代码: {}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Pages;
    use async_trait::async_trait;

    /// 以 \x0c 分页、以 | 分片段的文本"文档"
    struct PlainTextReader;

    #[async_trait]
    impl DocumentReader for PlainTextReader {
        async fn read_pages(&self, bytes: &[u8]) -> Result<Pages, DocumentError> {
            let text = std::str::from_utf8(bytes).map_err(|e| DocumentError::Malformed {
                reason: e.to_string(),
            })?;
            Ok(text
                .split('\x0c')
                .map(|page| page.split('|').map(String::from).collect())
                .collect())
        }
    }

    fn extractor() -> TextExtractor {
        TextExtractor::new(Arc::new(PlainTextReader))
    }

    #[test]
    fn test_extract_code_any_case() {
        let code = extract_code("El manuscrito dice ... acceso: XK92 ... fin");
        assert_eq!(code.unwrap().as_str(), "XK92");

        let code = extract_code("CÓDIGO DE ACCESO:XK92\nsiguiente línea");
        assert_eq!(code.unwrap().as_str(), "XK92");
    }

    #[test]
    fn test_extract_code_takes_first_match() {
        let code = extract_code("acceso: FIRST1 y luego acceso: SECOND2");
        assert_eq!(code.unwrap().as_str(), "FIRST1");
    }

    #[test]
    fn test_extract_code_absent() {
        assert!(extract_code("Sin pistas en este texto").is_none());
        assert!(extract_code("acceso: ---").is_none());
    }

    #[test]
    fn test_join_pages_preserves_order() {
        let pages = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ];
        assert_eq!(join_pages(&pages), "a b\nc\n");
    }

    #[tokio::test]
    async fn test_extract_full_text_uses_reader_pages() {
        let text = extractor()
            .extract_full_text(b"a|b\x0cc")
            .await
            .unwrap();
        assert!(text.contains("a b\nc\n"));
    }

    #[tokio::test]
    async fn test_read_code_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manuscrito-Libro_de_Kells.pdf");
        std::fs::write(&path, "Bienvenido|acceso: DEF2\x0cfin").unwrap();

        let code = extractor().read_code(&path).await;
        assert_eq!(code.unwrap().as_str(), "DEF2");
    }

    #[tokio::test]
    async fn test_missing_document_is_reported_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-existe.pdf");

        assert!(extractor().read_text(&path).await.is_none());
        assert!(extractor().read_code(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_is_reported_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.pdf");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(extractor().read_code(&path).await.is_none());
    }
}
