//! 基础设施层
//!
//! 持有稀缺资源（浏览器会话、页面），对上只暴露能力接口：
//! - [`UiActor`]：页面交互
//! - [`DocumentReader`]：文档解析

pub mod document_reader;
pub mod js_executor;
pub mod page_actor;
pub mod ui;

pub use document_reader::{DocumentReader, Pages, PdfDocumentReader};
pub use js_executor::JsExecutor;
pub use page_actor::{PageActor, PageActorSettings};
pub use ui::{Container, CredentialField, ElementTarget, Locator, UiActor};
