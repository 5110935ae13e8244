//! 基于 chromiumoxide 的 [`UiActor`] 实现
//!
//! 元素操作都通过 [`JsExecutor`] 在页面中执行，只有登录表单使用原生输入事件。
//! 下载由 CDP 写入暂存目录，完成后再移动到目标路径。

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::error::{UiError, UiResult};
use crate::infrastructure::js_executor::JsExecutor;
use crate::infrastructure::ui::{Container, CredentialField, ElementTarget, UiActor};

/// 暂存目录名（位于保存目录下）
const STAGING_DIR: &str = ".descargas";

/// Chromium 未完成下载的后缀
const PARTIAL_SUFFIX: &str = ".crdownload";

/// 页面交互参数
#[derive(Debug, Clone)]
pub struct PageActorSettings {
    /// 查找手稿容器的上限
    pub container_timeout: Duration,
    /// 登录后跳转的上限
    pub navigation_timeout: Duration,
    /// 下载落盘的上限
    pub download_timeout: Duration,
}

impl Default for PageActorSettings {
    fn default() -> Self {
        Self {
            container_timeout: Duration::from_secs(20),
            navigation_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(30),
        }
    }
}

/// 持有浏览器会话的页面操作者
pub struct PageActor {
    executor: JsExecutor,
    session: Mutex<Option<BrowserSession>>,
    staging_dir: PathBuf,
    settings: PageActorSettings,
}

impl PageActor {
    /// 接管会话并把下载目录指向 `<save_dir>/.descargas`
    pub async fn open(
        session: BrowserSession,
        executor: JsExecutor,
        save_dir: &Path,
        settings: PageActorSettings,
    ) -> UiResult<Self> {
        let staging_dir = save_dir.join(STAGING_DIR);
        if let Err(e) = prepare_downloads(&session, &staging_dir).await {
            // 还没交出所有权，这里负责关闭
            if let Err(close_err) = session.close().await {
                warn!("关闭浏览器失败: {}", close_err);
            }
            return Err(e);
        }

        Ok(Self {
            executor,
            session: Mutex::new(Some(session)),
            staging_dir,
            settings,
        })
    }

    async fn ensure_open(&self) -> UiResult<()> {
        if self.session.lock().await.is_none() {
            return Err(UiError::SessionClosed);
        }
        Ok(())
    }

    /// 清空暂存目录
    async fn reset_staging(&self) -> UiResult<()> {
        let io_err = |source| UiError::Download {
            path: self.staging_dir.display().to_string(),
            source,
        };
        if fs::metadata(&self.staging_dir).await.is_ok() {
            fs::remove_dir_all(&self.staging_dir).await.map_err(io_err)?;
        }
        fs::create_dir_all(&self.staging_dir).await.map_err(io_err)?;
        Ok(())
    }

    /// 等待暂存目录中出现完整的下载文件
    async fn wait_for_download(&self, what: &str) -> UiResult<PathBuf> {
        let deadline = Instant::now() + self.settings.download_timeout;
        loop {
            if let Some(path) = self.finished_download().await? {
                return Ok(path);
            }
            if Instant::now() >= deadline {
                return Err(UiError::timeout(what, self.settings.download_timeout));
            }
            sleep(Duration::from_millis(250)).await;
        }
    }

    async fn finished_download(&self) -> UiResult<Option<PathBuf>> {
        let io_err = |source| UiError::Download {
            path: self.staging_dir.display().to_string(),
            source,
        };
        let mut entries = fs::read_dir(&self.staging_dir).await.map_err(io_err)?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(PARTIAL_SUFFIX) {
                continue;
            }
            let len = entry.metadata().await.map(|m| m.len()).unwrap_or(0);
            if len > 0 {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

async fn prepare_downloads(session: &BrowserSession, staging_dir: &Path) -> UiResult<()> {
    fs::create_dir_all(staging_dir)
        .await
        .map_err(|source| UiError::Download {
            path: staging_dir.display().to_string(),
            source,
        })?;
    session.configure_downloads(staging_dir).await?;
    Ok(())
}

/// 在页面中定位 XPath 对应节点的表达式
fn node_js(target: &ElementTarget) -> UiResult<String> {
    Ok(format!(
        "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
        serde_json::to_string(&target.xpath())?
    ))
}

fn visible_js(target: &ElementTarget) -> UiResult<String> {
    Ok(format!(
        "(() => {{ const el = {}; return !!el && (el.offsetWidth > 0 || el.offsetHeight > 0 || el.getClientRects().length > 0); }})()",
        node_js(target)?
    ))
}

#[async_trait]
impl UiActor for PageActor {
    async fn navigate(&self, url: &str) -> UiResult<()> {
        self.ensure_open().await?;
        debug!("导航到: {}", url);
        self.executor.page().goto(url).await?;
        self.wait_for_idle(self.settings.navigation_timeout).await
    }

    async fn fill_credential(&self, field: CredentialField, value: &str) -> UiResult<()> {
        self.ensure_open().await?;
        self.executor
            .page()
            .find_element(field.selector())
            .await?
            .click()
            .await?
            .type_str(value)
            .await?;
        Ok(())
    }

    async fn submit_login(&self) -> UiResult<()> {
        self.ensure_open().await?;
        let page = self.executor.page();
        page.find_element("button[type=\"submit\"]")
            .await?
            .click()
            .await?;
        timeout(self.settings.navigation_timeout, page.wait_for_navigation())
            .await
            .map_err(|_| UiError::timeout("登录跳转", self.settings.navigation_timeout))??;
        Ok(())
    }

    async fn locate_resource_container(&self, title: &str) -> UiResult<Container> {
        self.ensure_open().await?;
        let container = Container::for_title(title);
        let exists = format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue !== null",
            serde_json::to_string(container.xpath())?
        );
        self.executor
            .wait_until(&exists, self.settings.container_timeout, &format!("手稿容器 \"{}\"", title))
            .await
            .map_err(|e| match e {
                UiError::Timeout { .. } => UiError::not_found(format!("手稿容器 \"{}\"", title)),
                other => other,
            })?;
        Ok(container)
    }

    async fn is_present(&self, target: &ElementTarget) -> UiResult<bool> {
        self.ensure_open().await?;
        self.executor
            .eval_as::<bool>(format!("{} !== null", node_js(target)?))
            .await
    }

    async fn wait_for_element_visible(&self, target: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.ensure_open().await?;
        self.executor
            .wait_until(&visible_js(target)?, timeout, &format!("{} 可见", target))
            .await
    }

    async fn wait_for_element_enabled(&self, target: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.ensure_open().await?;
        let js = format!(
            "(() => {{ const el = {}; return !!el && !el.disabled; }})()",
            node_js(target)?
        );
        self.executor
            .wait_until(&js, timeout, &format!("{} 可用", target))
            .await
    }

    async fn click(&self, target: &ElementTarget) -> UiResult<()> {
        self.ensure_open().await?;
        let js = format!(
            "(() => {{ const el = {}; if (!el) return false; el.scrollIntoView({{ block: 'center' }}); el.click(); return true; }})()",
            node_js(target)?
        );
        if !self.executor.eval_as::<bool>(js).await? {
            return Err(UiError::not_found(target.to_string()));
        }
        debug!("点击: {}", target);
        Ok(())
    }

    async fn fill_input(&self, target: &ElementTarget, text: &str) -> UiResult<()> {
        self.ensure_open().await?;
        // 走原生 setter，受控组件才能收到 input 事件
        let js = format!(
            r#"
            (() => {{
                const el = {};
                if (!el) return false;
                el.focus();
                const setter = Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value').set;
                setter.call(el, {});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            node_js(target)?,
            serde_json::to_string(text)?
        );
        if !self.executor.eval_as::<bool>(js).await? {
            return Err(UiError::not_found(target.to_string()));
        }
        Ok(())
    }

    async fn trigger_download_and_save(
        &self,
        target: &ElementTarget,
        destination: &Path,
    ) -> UiResult<PathBuf> {
        self.reset_staging().await?;
        self.click(target).await?;

        let downloaded = self
            .wait_for_download(&format!("{} 下载完成", target))
            .await?;

        let io_err = |source| UiError::Download {
            path: destination.display().to_string(),
            source,
        };
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        if fs::metadata(destination).await.is_ok() {
            fs::remove_file(destination).await.map_err(io_err)?;
        }
        fs::rename(&downloaded, destination).await.map_err(io_err)?;

        info!("PDF 已保存: {}", destination.display());
        Ok(destination.to_path_buf())
    }

    async fn wait_for_dialog(&self, dialog: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.wait_for_element_visible(dialog, timeout).await
    }

    async fn wait_for_dialog_hidden(&self, dialog: &ElementTarget, timeout: Duration) -> UiResult<()> {
        self.ensure_open().await?;
        let js = format!("!{}", visible_js(dialog)?);
        self.executor
            .wait_until(&js, timeout, &format!("{} 关闭", dialog))
            .await
    }

    async fn close_dialog(&self, close_button: &ElementTarget) -> UiResult<()> {
        self.click(close_button).await
    }

    async fn wait_for_idle(&self, timeout: Duration) -> UiResult<()> {
        self.ensure_open().await?;
        self.executor
            .wait_until("document.readyState === 'complete'", timeout, "页面加载完成")
            .await?;
        // SPA 切换后还会有一轮渲染
        sleep(Duration::from_millis(500)).await;
        Ok(())
    }

    async fn release(&self) -> UiResult<()> {
        let session = self.session.lock().await.take();
        match session {
            Some(session) => {
                session.close().await?;
                Ok(())
            }
            None => {
                warn!("浏览器会话已经释放过");
                Ok(())
            }
        }
    }
}
