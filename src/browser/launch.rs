use std::path::Path;

use anyhow::{anyhow, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use tracing::{debug, error, info};

use super::BrowserSession;

/// 启动浏览器并打开空白页面
///
/// # 参数
/// - `headless`: 是否无头模式
/// - `executable`: 指定浏览器可执行文件，None 时由 chromiumoxide 自动查找
pub async fn launch_browser(
    headless: bool,
    executable: Option<&Path>,
) -> Result<(BrowserSession, Page)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if headless { "无头模式" } else { "有界面" }
    );

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ])
        .build()
        .map_err(|e| anyhow!("配置浏览器失败: {}", e))?;

    let (browser, handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");
    let session = BrowserSession::start(browser, handler, true);

    match session.blank_page().await {
        Ok(page) => Ok((session, page)),
        Err(e) => {
            error!("创建页面失败: {}", e);
            session.close().await?;
            Err(anyhow!("创建页面失败: {}", e))
        }
    }
}
