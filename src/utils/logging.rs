/// 日志工具模块
///
/// 初始化 tracing，并提供启动、步骤、结束时的格式化输出
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::Resource;
use crate::orchestrator::pipeline::{PipelineState, PipelineStatus};
use crate::services::CompletionReport;
use crate::workflow::StepCtx;

/// 初始化日志输出
///
/// `RUST_LOG` 优先；否则 `verbose` 为 true 时输出 debug 级别。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 手稿解锁流程");
    info!("📁 保存目录: {}", config.pdf_save_path.display());
    match config.browser_debug_port {
        Some(port) => info!("🔌 连接已有浏览器 (端口: {})", port),
        None => info!("🌐 启动新浏览器 (无头: {})", config.headless),
    }
    info!("{}", "=".repeat(60));
}

/// 记录手稿清单
pub fn log_catalog(resources: &[Resource]) {
    info!("✓ 共 {} 本手稿待处理", resources.len());
    for resource in resources {
        let mut tags = Vec::new();
        if resource.requires_challenge {
            tags.push("挑战");
        }
        if resource.is_terminal {
            tags.push("终点");
        }
        if tags.is_empty() {
            info!("  {}. {}", resource.order_index + 1, resource.title);
        } else {
            info!(
                "  {}. {} [{}]",
                resource.order_index + 1,
                resource.title,
                tags.join(", ")
            );
        }
    }
}

/// 记录步骤开始
pub fn log_step_start(ctx: &StepCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始处理", ctx);
}

/// 记录通关检查结果
pub fn log_completion(report: &CompletionReport) {
    match &report.markers {
        Some([first, second]) if report.found => {
            info!("🏆 在 PDF 中找到通关信息:");
            info!("   {}", first);
            info!("   {}", second);
        }
        _ => warn!("⚠️ PDF 中没有找到通关信息"),
    }
}

/// 打印最终统计信息
pub fn print_final_summary(
    state: &PipelineState,
    total: usize,
    started_at: chrono::DateTime<chrono::Local>,
) {
    let finished_at = chrono::Local::now();
    info!("\n{}", "=".repeat(60));
    info!("📊 流程结束");
    info!("开始时间: {}", started_at.format("%Y-%m-%d %H:%M:%S"));
    info!("完成时间: {}", finished_at.format("%Y-%m-%d %H:%M:%S"));
    info!("耗时: {} 秒", (finished_at - started_at).num_seconds());
    info!("{}", "=".repeat(60));
    match &state.status {
        PipelineStatus::Completed => info!("✅ 全部 {} 本手稿处理完成", total),
        PipelineStatus::Aborted { index, title, cause } => {
            info!("❌ 在第 {}/{} 本 ({}) 中止: {}", index + 1, total, title, cause);
            if let Some(code) = &state.carried_code {
                info!("🔑 最后一个有效代码: {}", code);
            }
        }
        PipelineStatus::Running => warn!("⚠️ 流程未结束"),
    }
    info!("{}", "=".repeat(60));
}
