//! 步骤策略与等待上限

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::UiResult;

/// 单个界面步骤的失败策略
///
/// `tolerant` 为 true 时失败只记警告，流程继续；否则失败中断当前手稿。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    pub label: &'static str,
    pub tolerant: bool,
}

impl StepPolicy {
    pub const fn fatal(label: &'static str) -> Self {
        Self {
            label,
            tolerant: false,
        }
    }

    pub const fn tolerant(label: &'static str) -> Self {
        Self {
            label,
            tolerant: true,
        }
    }

    /// 执行步骤，容忍的失败返回 `Ok(None)`
    pub async fn guard<T, F>(&self, step: F) -> UiResult<Option<T>>
    where
        F: Future<Output = UiResult<T>>,
    {
        match step.await {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.tolerant => {
                warn!("⚠️ {} 未完成，继续执行: {}", self.label, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// 切换到第二页列表
pub const SECONDARY_LISTING: StepPolicy = StepPolicy::tolerant("切换到第二页列表");
/// 关闭解锁成功弹窗（部分路径不会出现）
pub const SUCCESS_DIALOG: StepPolicy = StepPolicy::tolerant("关闭解锁成功弹窗");
/// 关闭说明文档弹窗
pub const DOCUMENTATION_DIALOG: StepPolicy = StepPolicy::fatal("关闭说明文档弹窗");
/// 提交解锁代码
pub const SUBMIT_CODE: StepPolicy = StepPolicy::fatal("提交解锁代码");
/// 下载文档
pub const DOWNLOAD: StepPolicy = StepPolicy::fatal("下载文档");
/// 登录
pub const LOGIN: StepPolicy = StepPolicy::fatal("登录");

/// 各类界面等待的上限
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub download_visible: Duration,
    pub download_enabled: Duration,
    pub input_visible: Duration,
    pub unlock_enabled: Duration,
    pub challenge_input_visible: Duration,
    pub challenge_unlock_visible: Duration,
    pub challenge_unlock_enabled: Duration,
    pub dialog: Duration,
    pub secondary_listing: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            download_visible: Duration::from_secs(20),
            download_enabled: Duration::from_secs(15),
            input_visible: Duration::from_secs(10),
            unlock_enabled: Duration::from_secs(5),
            challenge_input_visible: Duration::from_secs(20),
            challenge_unlock_visible: Duration::from_secs(10),
            challenge_unlock_enabled: Duration::from_secs(10),
            dialog: Duration::from_secs(10),
            secondary_listing: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UiError;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_tolerant_step_swallows_failure() {
        let result = SUCCESS_DIALOG
            .guard(async { Err::<(), _>(UiError::timeout("弹窗", Duration::from_secs(10))) })
            .await;
        assert_eq!(assert_ok!(result), None);
    }

    #[tokio::test]
    async fn test_fatal_step_propagates_failure() {
        let result = SUBMIT_CODE
            .guard(async { Err::<(), _>(UiError::not_found("输入框")) })
            .await;
        assert_err!(result);
    }

    #[tokio::test]
    async fn test_successful_step_returns_value() {
        let result = SECONDARY_LISTING.guard(async { Ok(7) }).await;
        assert_eq!(result.unwrap(), Some(7));
    }
}
