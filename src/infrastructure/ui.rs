//! 浏览器交互能力
//!
//! 流程层只通过 [`UiActor`] 操作页面，便于在测试中替换为脚本化的替身。
//! 元素统一用 XPath 定位，手稿相关的元素都限定在该手稿的卡片容器内。

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::UiResult;

/// 登录表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Email,
    Password,
}

impl CredentialField {
    /// 对应的 CSS 选择器
    pub fn selector(&self) -> &'static str {
        match self {
            CredentialField::Email => "#email",
            CredentialField::Password => "#password",
        }
    }
}

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// 文本包含给定内容的按钮
    ButtonText(String),
    /// 文本完全等于给定内容的按钮
    ButtonExact(String),
    /// aria-label 等于给定内容的按钮
    ButtonLabel(String),
    /// placeholder 等于给定内容的输入框
    InputPlaceholder(String),
    /// role="dialog" 的弹窗
    Dialog,
    /// 包含给定文本的弹窗
    DialogWithText(String),
}

impl Locator {
    /// 相对 XPath 片段，总是以 `//` 开头
    fn xpath_fragment(&self) -> String {
        match self {
            Locator::ButtonText(text) => {
                format!("//button[contains(normalize-space(.), {})]", xpath_literal(text))
            }
            Locator::ButtonExact(text) => {
                format!("//button[normalize-space(.)={}]", xpath_literal(text))
            }
            Locator::ButtonLabel(label) => {
                format!("//button[@aria-label={}]", xpath_literal(label))
            }
            Locator::InputPlaceholder(placeholder) => {
                format!("//input[@placeholder={}]", xpath_literal(placeholder))
            }
            Locator::Dialog => "//div[@role='dialog']".to_string(),
            Locator::DialogWithText(text) => format!(
                "//div[@role='dialog'][.//*[contains(normalize-space(.), {})]]",
                xpath_literal(text)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::ButtonText(text) | Locator::ButtonExact(text) => write!(f, "按钮 \"{}\"", text),
            Locator::ButtonLabel(label) => write!(f, "按钮 [{}]", label),
            Locator::InputPlaceholder(placeholder) => write!(f, "输入框 \"{}\"", placeholder),
            Locator::Dialog => write!(f, "弹窗"),
            Locator::DialogWithText(text) => write!(f, "弹窗 \"{}\"", text),
        }
    }
}

/// 一本手稿在列表中的卡片容器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub title: String,
    xpath: String,
}

impl Container {
    /// 标题文本所在元素最近的 `group` 卡片
    pub fn for_title(title: &str) -> Self {
        Self {
            title: title.to_string(),
            xpath: format!(
                "//*[contains(normalize-space(text()), {})]/ancestor::div[contains(@class, 'group')][1]",
                xpath_literal(title)
            ),
        }
    }

    pub fn xpath(&self) -> &str {
        &self.xpath
    }

    /// 容器内的元素
    pub fn find(&self, locator: Locator) -> ElementTarget {
        ElementTarget {
            scope: Some(self.xpath.clone()),
            scope_label: Some(self.title.clone()),
            locator,
        }
    }
}

/// 可操作的目标元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTarget {
    scope: Option<String>,
    scope_label: Option<String>,
    pub locator: Locator,
}

impl ElementTarget {
    /// 整个页面范围内的元素
    pub fn page(locator: Locator) -> Self {
        Self {
            scope: None,
            scope_label: None,
            locator,
        }
    }

    /// 当前元素内部的元素（例如弹窗里的关闭按钮）
    pub fn find(&self, locator: Locator) -> ElementTarget {
        ElementTarget {
            scope: Some(self.xpath()),
            scope_label: Some(self.to_string()),
            locator,
        }
    }

    /// 所属手稿标题（页面级元素为 None）
    pub fn scope_label(&self) -> Option<&str> {
        self.scope_label.as_deref()
    }

    /// 绝对 XPath
    pub fn xpath(&self) -> String {
        match &self.scope {
            Some(scope) => format!("({})[1]{}", scope, self.locator.xpath_fragment()),
            None => self.locator.xpath_fragment(),
        }
    }
}

impl fmt::Display for ElementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope_label {
            Some(scope) => write!(f, "[{}] {}", scope, self.locator),
            None => write!(f, "{}", self.locator),
        }
    }
}

/// 把任意字符串写成 XPath 字面量
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// 浏览器交互能力
///
/// 每个等待都有明确的上限，超时即返回 [`crate::error::UiError::Timeout`]，
/// 是否容忍由调用方的 [`crate::workflow::StepPolicy`] 决定。
#[async_trait]
pub trait UiActor: Send + Sync {
    async fn navigate(&self, url: &str) -> UiResult<()>;

    async fn fill_credential(&self, field: CredentialField, value: &str) -> UiResult<()>;

    /// 提交登录表单并等待跳转完成
    async fn submit_login(&self) -> UiResult<()>;

    async fn locate_resource_container(&self, title: &str) -> UiResult<Container>;

    /// 立即检查元素是否存在，不等待
    async fn is_present(&self, target: &ElementTarget) -> UiResult<bool>;

    async fn wait_for_element_visible(&self, target: &ElementTarget, timeout: Duration) -> UiResult<()>;

    async fn wait_for_element_enabled(&self, target: &ElementTarget, timeout: Duration) -> UiResult<()>;

    async fn click(&self, target: &ElementTarget) -> UiResult<()>;

    async fn fill_input(&self, target: &ElementTarget, text: &str) -> UiResult<()>;

    /// 点击下载按钮，把下载结果保存到 `destination` 并返回最终路径
    async fn trigger_download_and_save(
        &self,
        target: &ElementTarget,
        destination: &Path,
    ) -> UiResult<PathBuf>;

    async fn wait_for_dialog(&self, dialog: &ElementTarget, timeout: Duration) -> UiResult<()>;

    async fn wait_for_dialog_hidden(&self, dialog: &ElementTarget, timeout: Duration) -> UiResult<()>;

    async fn close_dialog(&self, close_button: &ElementTarget) -> UiResult<()>;

    /// 等待页面加载稳定
    async fn wait_for_idle(&self, timeout: Duration) -> UiResult<()>;

    /// 释放浏览器会话，之后的任何调用都会返回 `SessionClosed`
    async fn release(&self) -> UiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_scoped_xpath() {
        let container = Container::for_title("Libro de Kells");
        let input = container.find(Locator::InputPlaceholder("Ingresá el código".to_string()));

        assert_eq!(
            input.xpath(),
            "(//*[contains(normalize-space(text()), 'Libro de Kells')]/ancestor::div[contains(@class, 'group')][1])[1]//input[@placeholder='Ingresá el código']"
        );
        assert_eq!(input.to_string(), "[Libro de Kells] 输入框 \"Ingresá el código\"");
        assert_eq!(input.scope_label(), Some("Libro de Kells"));
    }

    #[test]
    fn test_nested_dialog_button() {
        let dialog = ElementTarget::page(Locator::Dialog);
        let close = dialog.find(Locator::ButtonLabel("Cerrar modal".to_string()));
        assert_eq!(
            close.xpath(),
            "(//div[@role='dialog'])[1]//button[@aria-label='Cerrar modal']"
        );
    }

    #[test]
    fn test_xpath_literal_quotes() {
        assert_eq!(xpath_literal("Kells"), "'Kells'");
        assert_eq!(xpath_literal("O'Neil"), "\"O'Neil\"");
        assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
    }
}
