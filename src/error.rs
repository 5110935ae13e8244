//! 错误类型
//!
//! 按来源分层：配置 / 文档 / 挑战服务 / 浏览器交互 / 解锁流程，
//! 最终汇总到 [`AppError`]。二进制入口仍然使用 `anyhow::Result`。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文档读取错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 挑战服务错误
    #[error("挑战服务错误: {0}")]
    Challenge(#[from] ChallengeError),
    /// 浏览器交互错误
    #[error("界面交互错误: {0}")]
    Ui(#[from] UiError),
    /// 解锁流程错误
    #[error("流程错误: {0}")]
    Pipeline(#[from] PipelineError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    MissingVar { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    InvalidValue {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取清单文件失败
    #[error("读取清单文件失败 ({path}): {source}")]
    CatalogRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 清单 TOML 解析失败
    #[error("清单 TOML 解析失败 ({path}): {source}")]
    CatalogParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 清单内容不合法
    #[error("清单不合法: {reason}")]
    InvalidCatalog { reason: String },
}

/// 文档错误
///
/// 在文本提取器内部被降级为"没有找到代码"，不会直接中断流程。
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    Unavailable { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文档结构无法解析
    #[error("文档无法解析: {reason}")]
    Malformed { reason: String },
}

/// 挑战服务错误
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// 服务返回非成功状态码
    #[error("获取 \"{title}\" 的挑战失败: HTTP {status}")]
    RemoteStatus { title: String, status: u16 },
    /// 网络请求本身失败
    #[error("请求 \"{title}\" 的挑战失败: {source}")]
    Transport {
        title: String,
        #[source]
        source: reqwest::Error,
    },
    /// 响应缺少 success 标记或 challenge 内容
    #[error("\"{title}\" 的挑战响应无效: {reason}")]
    InvalidResponse { title: String, reason: String },
    /// targets 中的索引越界
    #[error("挑战索引 {target} 超出 vault 范围 [0, {vault_len})")]
    TargetOutOfRange { target: usize, vault_len: usize },
}

/// 浏览器交互错误
#[derive(Debug, Error)]
pub enum UiError {
    /// 等待超时
    #[error("等待 {what} 超时 ({timeout_ms}ms)")]
    Timeout { what: String, timeout_ms: u64 },
    /// 元素不存在
    #[error("找不到元素: {what}")]
    ElementNotFound { what: String },
    /// CDP 调用失败
    #[error("浏览器调用失败: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值无法解析
    #[error("脚本结果解析失败: {0}")]
    Script(#[from] serde_json::Error),
    /// 下载文件落盘失败
    #[error("保存下载文件失败 ({path}): {source}")]
    Download {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 浏览器会话已经释放
    #[error("浏览器会话已关闭")]
    SessionClosed,
}

/// 解锁流程错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 文档中没有找到解锁代码
    #[error("无法从 \"{title}\" 的文档中提取代码")]
    CodeNotFound { title: String },
    /// 解锁代码缺失或为空
    #[error("解锁 \"{title}\" (第 {index} 本) 的代码无效")]
    InvalidCode { index: usize, title: String },
    /// 清单遍历结束但没有遇到终点资源
    #[error("清单中没有终点资源")]
    NoTerminalResource,
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    /// 创建缺失变量错误
    pub fn missing(var_name: impl Into<String>) -> Self {
        ConfigError::MissingVar {
            var_name: var_name.into(),
        }
    }

    /// 创建清单不合法错误
    pub fn invalid_catalog(reason: impl Into<String>) -> Self {
        ConfigError::InvalidCatalog {
            reason: reason.into(),
        }
    }
}

impl UiError {
    /// 创建超时错误
    pub fn timeout(what: impl Into<String>, timeout: std::time::Duration) -> Self {
        UiError::Timeout {
            what: what.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// 创建元素不存在错误
    pub fn not_found(what: impl Into<String>) -> Self {
        UiError::ElementNotFound { what: what.into() }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 浏览器交互结果类型
pub type UiResult<T> = Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_keeps_milliseconds() {
        let err = UiError::timeout("按钮 \"Desbloquear\"", Duration::from_secs(5));
        assert!(matches!(err, UiError::Timeout { timeout_ms: 5000, .. }));
        assert!(err.to_string().contains("5000ms"));
    }

    #[test]
    fn test_app_error_wraps_layers() {
        let err: AppError = PipelineError::CodeNotFound {
            title: "Libro de Kells".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("流程错误"));
        assert!(err.to_string().contains("Libro de Kells"));
    }
}
