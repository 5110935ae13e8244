//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"和"轮询等待"的能力

use std::time::Duration;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{UiError, UiResult};

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识手稿 / 解锁流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> UiResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> UiResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 反复执行布尔表达式直到为 true 或超时
    ///
    /// 页面跳转过程中脚本可能执行失败，这类失败按 false 处理继续轮询。
    pub async fn wait_until(&self, js_code: &str, timeout: Duration, what: &str) -> UiResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.eval_as::<bool>(js_code).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => debug!("轮询 {} 时脚本执行失败: {}", what, e),
            }

            if Instant::now() >= deadline {
                return Err(UiError::timeout(what, timeout));
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
