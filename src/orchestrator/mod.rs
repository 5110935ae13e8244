//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 校验配置、加载清单
//! - 获取浏览器会话
//! - 输出最终统计
//!
//! ### `pipeline` - 解锁流水线
//! - 逐本推进的状态机
//! - 决定每一步的代码来源
//! - 首个失败即中止，保证会话释放
//!
//! ## 层次关系
//!
//! ```text
//! app (配置 + 资源)
//!     ↓
//! pipeline (Vec<Resource> 状态机)
//!     ↓
//! workflow::UnlockFlow (单本手稿的页面操作)
//!     ↓
//! services (文本提取 / 挑战 / 完成检查)
//!     ↓
//! infrastructure (UiActor / DocumentReader)
//! ```

pub mod app;
pub mod pipeline;

pub use app::App;
pub use pipeline::{PipelineOptions, PipelineState, PipelineStatus, UnlockPipeline};
