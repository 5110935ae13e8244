//! 浏览器会话
//!
//! 两种获取方式：自行启动（`launch`）或连接到已开启调试端口的浏览器（`connection`）。

pub mod connection;
pub mod launch;

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Handler, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

pub use connection::connect_to_browser_and_page;
pub use launch::launch_browser;

/// 一次运行独占的浏览器会话
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 是否由本程序启动（连接模式下不关闭用户的浏览器）
    owned: bool,
}

impl BrowserSession {
    /// 接管浏览器，并在后台处理 CDP 事件
    pub(crate) fn start(browser: Browser, mut handler: Handler, owned: bool) -> Self {
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        Self {
            browser,
            handler,
            owned,
        }
    }

    /// 新建空白页面
    pub(crate) async fn blank_page(&self) -> Result<Page, CdpError> {
        // 等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;
        self.browser.new_page("about:blank").await
    }

    /// 让浏览器把下载文件放到指定目录
    pub async fn configure_downloads(&self, dir: &Path) -> Result<(), CdpError> {
        let mut params = SetDownloadBehaviorParams::new(SetDownloadBehaviorBehavior::Allow);
        params.download_path = Some(dir.display().to_string());
        self.browser.execute(params).await?;
        debug!("下载目录: {}", dir.display());
        Ok(())
    }

    /// 关闭会话
    pub async fn close(mut self) -> Result<(), CdpError> {
        if self.owned {
            self.browser.close().await?;
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
            info!("🧹 浏览器已关闭");
        } else {
            info!("🧹 已断开与浏览器的连接");
        }
        self.handler.abort();
        Ok(())
    }
}
