use anyhow::Result;
use chromiumoxide::{Browser, Page};
use tracing::{error, info};

use super::BrowserSession;

/// 连接到已开启远程调试的浏览器，并新建一个页面
///
/// 连接模式下结束时只断开，不关闭用户的浏览器。
pub async fn connect_to_browser_and_page(port: u16) -> Result<(BrowserSession, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("🔌 正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    let session = BrowserSession::start(browser, handler, false);

    match session.blank_page().await {
        Ok(page) => Ok((session, page)),
        Err(e) => {
            error!("创建新页面失败: {}", e);
            session.close().await?;
            Err(e.into())
        }
    }
}
