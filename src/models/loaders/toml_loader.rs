use crate::error::ConfigError;
use crate::models::resource::{build_catalog, CatalogEntry, Resource};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    resources: Vec<CatalogEntry>,
}

/// 从 TOML 文件加载手稿清单
///
/// ```toml
/// [[resources]]
/// title = "Codex Aureus de Echternach"
///
/// [[resources]]
/// title = "Necronomicon"
/// requires_challenge = true
/// ```
///
/// 最后一项视为终点资源。
pub async fn load_catalog(path: &Path) -> Result<Vec<Resource>, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::CatalogRead {
            path: path.display().to_string(),
            source,
        })?;

    let file: CatalogFile = toml::from_str(&content).map_err(|source| ConfigError::CatalogParse {
        path: path.display().to_string(),
        source,
    })?;

    let resources = build_catalog(file.resources)?;
    tracing::info!(
        "正在使用自定义清单: {} (共 {} 本)",
        path.file_name().unwrap_or_default().to_string_lossy(),
        resources.len()
    );

    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_catalog_marks_last_as_terminal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[resources]]
title = "Libro de Kells"

[[resources]]
title = "Necronomicon"
requires_challenge = true

[[resources]]
title = "Malleus Maleficarum"
"#
        )
        .unwrap();

        let resources = load_catalog(file.path()).await.unwrap();
        assert_eq!(resources.len(), 3);
        assert!(resources[1].requires_challenge);
        assert!(!resources[2].requires_challenge);
        assert!(resources[2].is_terminal);
        assert_eq!(resources[2].order_index, 2);
    }

    #[tokio::test]
    async fn test_load_catalog_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "resources = 3").unwrap();

        let err = load_catalog(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::CatalogParse { .. }));
    }

    #[tokio::test]
    async fn test_load_catalog_missing_file() {
        let err = load_catalog(Path::new("/no/such/catalog.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::CatalogRead { .. }));
    }
}
