//! 集成测试用的脚本化替身
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use manuscript_unlock::error::{AppError, ChallengeError, DocumentError, UiError, UiResult};
use manuscript_unlock::infrastructure::{
    Container, CredentialField, DocumentReader, ElementTarget, Pages, UiActor,
};
use manuscript_unlock::models::{ChallengeDescriptor, UnlockCode};
use manuscript_unlock::services::TextExtractor;

/// 记录每次页面操作的 UI 替身
///
/// 下载时把预设的文档文本写到目标路径；`fail_on` 中的片段命中等待目标时返回超时。
#[derive(Default)]
pub struct ScriptedUi {
    documents: HashMap<String, String>,
    fail_on: Vec<String>,
    fail_login: bool,
    events: Mutex<Vec<String>>,
    releases: AtomicUsize,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, title: &str, text: &str) -> Self {
        self.documents.insert(title.to_string(), text.to_string());
        self
    }

    /// 等待目标的描述包含 `fragment` 时超时
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on.push(fragment.to_string());
        self
    }

    pub fn failing_login(mut self) -> Self {
        self.fail_login = true;
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// 第一个以 `prefix` 开头的事件位置
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.events().iter().position(|e| e.starts_with(prefix))
    }

    pub fn any_event_mentions(&self, text: &str) -> bool {
        self.events().iter().any(|e| e.contains(text))
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn wait(&self, kind: &str, target: &ElementTarget, timeout: Duration) -> UiResult<()> {
        let label = target.to_string();
        self.record(format!("{}:{}", kind, label));
        if self.fail_on.iter().any(|f| label.contains(f.as_str())) {
            return Err(UiError::timeout(label, timeout));
        }
        Ok(())
    }
}

#[async_trait]
impl UiActor for ScriptedUi {
    async fn navigate(&self, url: &str) -> UiResult<()> {
        self.record(format!("navigate:{}", url));
        Ok(())
    }

    async fn fill_credential(&self, field: CredentialField, value: &str) -> UiResult<()> {
        self.record(format!("credential:{:?}={}", field, value));
        Ok(())
    }

    async fn submit_login(&self) -> UiResult<()> {
        self.record("submit_login".to_string());
        if self.fail_login {
            return Err(UiError::timeout("登录跳转", Duration::from_secs(30)));
        }
        Ok(())
    }

    async fn locate_resource_container(&self, title: &str) -> UiResult<Container> {
        self.record(format!("locate:{}", title));
        Ok(Container::for_title(title))
    }

    async fn is_present(&self, target: &ElementTarget) -> UiResult<bool> {
        self.record(format!("present:{}", target));
        Ok(true)
    }

    async fn wait_for_element_visible(&self, target: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.wait("visible", target, timeout)
    }

    async fn wait_for_element_enabled(&self, target: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.wait("enabled", target, timeout)
    }

    async fn click(&self, target: &ElementTarget) -> UiResult<()> {
        self.record(format!("click:{}", target));
        Ok(())
    }

    async fn fill_input(&self, target: &ElementTarget, text: &str) -> UiResult<()> {
        self.record(format!(
            "fill:{}={}",
            target.scope_label().unwrap_or_default(),
            text
        ));
        Ok(())
    }

    async fn trigger_download_and_save(
        &self,
        target: &ElementTarget,
        destination: &Path,
    ) -> UiResult<PathBuf> {
        let title = target.scope_label().unwrap_or_default().to_string();
        self.record(format!("download:{}", title));
        let text = self.documents.get(&title).cloned().unwrap_or_default();
        tokio::fs::write(destination, text)
            .await
            .map_err(|source| UiError::Download {
                path: destination.display().to_string(),
                source,
            })?;
        Ok(destination.to_path_buf())
    }

    async fn wait_for_dialog(&self, dialog: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.wait("dialog", dialog, timeout)
    }

    async fn wait_for_dialog_hidden(&self, dialog: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.wait("dialog_hidden", dialog, timeout)
    }

    async fn close_dialog(&self, close_button: &ElementTarget) -> UiResult<()> {
        self.record(format!("close:{}", close_button));
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> UiResult<()> {
        self.record("idle".to_string());
        Ok(())
    }

    async fn release(&self) -> UiResult<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.record("release".to_string());
        Ok(())
    }
}

/// 以 \x0c 分页、以 | 分片段的文本"文档"
pub struct PlainTextReader;

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

pub fn plain_text_extractor() -> TextExtractor {
    TextExtractor::new(Arc::new(PlainTextReader))
}

/// 固定应答的挑战来源，记录每次请求
pub struct FixedChallenge {
    outcome: Result<ChallengeDescriptor, u16>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FixedChallenge {
    pub fn answering(vault: &[&str], targets: &[usize]) -> Self {
        Self {
            outcome: Ok(ChallengeDescriptor {
                vault: vault.iter().map(|s| s.to_string()).collect(),
                targets: targets.to_vec(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            outcome: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl manuscript_unlock::services::ChallengeSource for FixedChallenge {
    async fn fetch_challenge(
        &self,
        resource_title: &str,
        previous_code: &UnlockCode,
    ) -> Result<ChallengeDescriptor, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push((resource_title.to_string(), previous_code.to_string()));
        match &self.outcome {
            Ok(descriptor) => Ok(descriptor.clone()),
            Err(status) => Err(ChallengeError::RemoteStatus {
                title: resource_title.to_string(),
                status: *status,
            }
            .into()),
        }
    }
}

/// 参考清单每本手稿的文档内容
pub fn happy_documents(ui: ScriptedUi) -> ScriptedUi {
    ui.with_document("Codex Aureus de Echternach", "Prólogo|acceso: ABC1")
        .with_document("Libro de Kells", "Folio I\x0cCódigo de acceso: DEF2")
        .with_document("Codex Seraphinianus", "acceso: GHI3")
        .with_document("Necronomicon", "Capítulo final|acceso: MNO5")
        .with_document(
            "Malleus Maleficarum",
            "¡Felicitaciones, Maestro del Scraping!\x0cDesafío Completado - Nivel Maestro",
        )
}
