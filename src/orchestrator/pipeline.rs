//! 解锁流水线 - 编排层
//!
//! ## 状态机
//!
//! ```text
//! Running ──(每本手稿一步)──▶ Running
//!    │                          │
//!    ├──任何非容忍失败──▶ Aborted{index, cause}
//!    └──终点手稿下载完成──▶ Completed
//! ```
//!
//! 每一步：
//! 1. 决定代码来源（上一本提取的代码，或挑战服务解出的代码）
//! 2. 第一本挑战手稿之前切换到第二页
//! 3. 在页面上解锁
//! 4. 下载文档并提取下一本的代码；终点手稿改为检查通关标记
//!
//! 没有重试。无论以何种状态结束，浏览器会话都只释放一次。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::LoginSettings;
use crate::error::{AppError, AppResult, PipelineError};
use crate::infrastructure::UiActor;
use crate::models::{Resource, UnlockCode};
use crate::services::{check_completion, resolve_challenge, ChallengeSource, CompletionReport, TextExtractor};
use crate::utils::logging;
use crate::workflow::{SettleDelays, StepCtx, Timeouts, UnlockFlow};

/// 流水线参数
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// PDF 保存目录
    pub save_dir: PathBuf,
    /// 设置后先登录
    pub login: Option<LoginSettings>,
    pub timeouts: Timeouts,
    pub delays: SettleDelays,
    /// 终点手稿下载后的停留时间
    pub final_linger: Duration,
}

impl PipelineOptions {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            login: None,
            timeouts: Timeouts::default(),
            delays: SettleDelays::default(),
            final_linger: Duration::from_secs(5),
        }
    }

    pub fn with_login(mut self, login: LoginSettings) -> Self {
        self.login = Some(login);
        self
    }

    /// 去掉所有固定停顿（测试用）
    pub fn without_delays(mut self) -> Self {
        self.delays = SettleDelays {
            unlock: Duration::ZERO,
            challenge_unlock: Duration::ZERO,
        };
        self.final_linger = Duration::ZERO;
        self
    }
}

/// 流水线状态
#[derive(Debug)]
pub enum PipelineStatus {
    Running,
    Aborted {
        index: usize,
        title: String,
        cause: AppError,
    },
    Completed,
}

#[derive(Debug)]
pub struct PipelineState {
    pub current_index: usize,
    /// 最近一次成功提取的代码
    pub carried_code: Option<UnlockCode>,
    pub status: PipelineStatus,
    /// 终点手稿的通关检查结果，仅供展示
    pub completion: Option<CompletionReport>,
}

impl PipelineState {
    fn new() -> Self {
        Self {
            current_index: 0,
            carried_code: None,
            status: PipelineStatus::Running,
            completion: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, PipelineStatus::Running)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, PipelineStatus::Completed)
    }

    fn abort(&mut self, index: usize, title: impl Into<String>, cause: AppError) {
        self.status = PipelineStatus::Aborted {
            index,
            title: title.into(),
            cause,
        };
    }
}

/// 单步结果
enum StepOutcome {
    /// 拿到了下一本的代码
    Advance(UnlockCode),
    /// 终点手稿处理完毕
    Finished(Option<CompletionReport>),
}

/// 解锁流水线
pub struct UnlockPipeline {
    ui: Arc<dyn UiActor>,
    challenges: Arc<dyn ChallengeSource>,
    extractor: TextExtractor,
    flow: UnlockFlow,
    options: PipelineOptions,
}

impl UnlockPipeline {
    pub fn new(
        ui: Arc<dyn UiActor>,
        challenges: Arc<dyn ChallengeSource>,
        extractor: TextExtractor,
        options: PipelineOptions,
    ) -> Self {
        let flow = UnlockFlow::new(options.timeouts.clone(), options.delays.clone());
        Self {
            ui,
            challenges,
            extractor,
            flow,
            options,
        }
    }

    /// 按顺序处理全部手稿，返回最终状态
    pub async fn run(&self, resources: &[Resource]) -> PipelineState {
        let mut state = PipelineState::new();

        self.drive(resources, &mut state).await;

        if let Err(e) = self.ui.release().await {
            warn!("⚠️ 释放浏览器会话失败: {}", e);
        }

        state
    }

    async fn drive(&self, resources: &[Resource], state: &mut PipelineState) {
        if let Some(login) = &self.options.login {
            if let Err(e) = self.flow.login(self.ui.as_ref(), login).await {
                error!("❌ 登录失败: {}", e);
                state.abort(0, login.url.clone(), e.into());
                return;
            }
        }

        let first_challenge = resources
            .iter()
            .find(|r| r.requires_challenge && r.needs_unlock())
            .map(|r| r.order_index);

        while state.is_running() {
            let Some(resource) = resources.get(state.current_index) else {
                let cause: AppError = PipelineError::NoTerminalResource.into();
                error!("❌ {}", cause);
                state.abort(state.current_index, "", cause);
                break;
            };

            let ctx = StepCtx::new(resource, resources.len());
            logging::log_step_start(&ctx);

            match self
                .step(resource, &ctx, state.carried_code.as_ref(), first_challenge)
                .await
            {
                Ok(StepOutcome::Advance(code)) => {
                    state.carried_code = Some(code);
                    state.current_index += 1;
                }
                Ok(StepOutcome::Finished(report)) => {
                    state.completion = report;
                    state.status = PipelineStatus::Completed;
                }
                Err(cause) => {
                    error!("{} ❌ 流程中止: {}", ctx, cause);
                    state.abort(resource.order_index, resource.title.clone(), cause);
                }
            }
        }
    }

    async fn step(
        &self,
        resource: &Resource,
        ctx: &StepCtx,
        carried: Option<&UnlockCode>,
        first_challenge: Option<usize>,
    ) -> AppResult<StepOutcome> {
        let ui = self.ui.as_ref();

        if resource.needs_unlock() {
            let code = self.derive_code(resource, ctx, carried).await?;

            if first_challenge == Some(resource.order_index) {
                self.flow.open_secondary_listing(ui).await?;
            }

            if resource.requires_challenge {
                self.flow.unlock_with_challenge(ui, ctx, &code).await?;
            } else {
                self.flow.unlock(ui, ctx, &code).await?;
            }
        }

        let path = self
            .flow
            .download(ui, resource, &self.options.save_dir)
            .await?;

        if resource.is_terminal {
            return Ok(StepOutcome::Finished(self.finish(ctx, &path).await));
        }

        match self.extractor.read_code(&path).await {
            Some(code) => Ok(StepOutcome::Advance(code)),
            None => Err(PipelineError::CodeNotFound {
                title: resource.title.clone(),
            }
            .into()),
        }
    }

    /// 决定本步要提交的代码，不触碰页面
    async fn derive_code(
        &self,
        resource: &Resource,
        ctx: &StepCtx,
        carried: Option<&UnlockCode>,
    ) -> AppResult<UnlockCode> {
        let invalid = || PipelineError::InvalidCode {
            index: resource.order_index,
            title: resource.title.clone(),
        };
        let carried = carried.ok_or_else(invalid)?;

        if !resource.requires_challenge {
            return Ok(carried.clone());
        }

        let descriptor = self
            .challenges
            .fetch_challenge(&resource.title, carried)
            .await?;
        let code = UnlockCode::new(resolve_challenge(&descriptor)?).ok_or_else(invalid)?;
        info!("{} 🧩 挑战代码: {}", ctx, code);
        Ok(code)
    }

    /// 终点手稿：读全文并检查通关标记
    async fn finish(&self, ctx: &StepCtx, path: &std::path::Path) -> Option<CompletionReport> {
        let report = match self.extractor.read_text(path).await {
            Some(text) => {
                let report = check_completion(&text);
                logging::log_completion(&report);
                Some(report)
            }
            None => {
                warn!("{} ⚠️ 无法读取最后一本手稿的全文", ctx);
                None
            }
        };

        info!(
            "{} 📥 最后一本已下载，{} 秒后结束",
            ctx,
            self.options.final_linger.as_secs()
        );
        if !self.options.final_linger.is_zero() {
            sleep(self.options.final_linger).await;
        }

        report
    }
}
