//! # Manuscript Unlock
//!
//! 按顺序解锁并下载一组手稿 PDF：每本手稿里的访问代码用来解锁下一本，
//! 后面几本需要先向挑战服务换取代码。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器会话、页面），只暴露能力
//! - `UiActor` - 页面交互能力，`PageActor` 是唯一的会话持有者
//! - `DocumentReader` - PDF 分页文本提取
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程顺序
//! - `TextExtractor` - 读取全文、提取访问代码
//! - `ChallengeClient` - 请求挑战并解出代码
//! - `check_completion` - 检查通关标记
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一本手稿"在页面上的操作
//! - `StepCtx` - 日志上下文（位置 + 标题）
//! - `UnlockFlow` - 解锁 / 挑战解锁 / 下载
//! - `StepPolicy` - 哪些步骤失败可以容忍
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 逐本推进的状态机
//! - `orchestrator/app` - 配置、浏览器、统计
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_browser, BrowserSession};
pub use config::{Config, LoginSettings};
pub use error::{AppError, AppResult};
pub use infrastructure::{DocumentReader, JsExecutor, PageActor, UiActor};
pub use models::{ChallengeDescriptor, Resource, UnlockCode};
pub use orchestrator::{App, PipelineOptions, PipelineState, PipelineStatus, UnlockPipeline};
pub use workflow::{StepCtx, UnlockFlow};
