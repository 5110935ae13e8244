//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **配置校验**：登录三项缺一不可，在启动浏览器之前完成
//! 2. **清单加载**：默认使用参考清单，`CATALOG_FILE` 可覆盖
//! 3. **资源获取**：启动或连接浏览器，交给 `PageActor` 独占
//! 4. **流程执行**：委托 `UnlockPipeline`，由它负责释放会话
//! 5. **统计输出**：打印最终结果

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::browser;
use crate::config::{Config, LoginSettings};
use crate::infrastructure::{JsExecutor, PageActor, PageActorSettings, PdfDocumentReader};
use crate::models::{load_catalog, reference_catalog, Resource};
use crate::orchestrator::pipeline::{PipelineOptions, PipelineState, UnlockPipeline};
use crate::services::{ChallengeClient, TextExtractor};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    login: LoginSettings,
    resources: Vec<Resource>,
}

impl App {
    /// 初始化应用，不接触浏览器和网络
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let login = config.login_settings()?;

        let resources = match &config.catalog_file {
            Some(path) => load_catalog(path).await?,
            None => reference_catalog(),
        };
        logging::log_catalog(&resources);

        Ok(Self {
            config,
            login,
            resources,
        })
    }

    /// 运行整条解锁流程
    pub async fn run(&self) -> Result<PipelineState> {
        let started_at = chrono::Local::now();

        let challenges = ChallengeClient::new(self.config.challenge_api_url.clone())?;
        let extractor = TextExtractor::new(Arc::new(PdfDocumentReader::new()));

        let actor = self.open_browser().await?;

        let options = PipelineOptions::new(self.config.pdf_save_path.clone())
            .with_login(self.login.clone());
        let pipeline = UnlockPipeline::new(Arc::new(actor), Arc::new(challenges), extractor, options);

        let state = pipeline.run(&self.resources).await;

        logging::print_final_summary(&state, self.resources.len(), started_at);
        Ok(state)
    }

    async fn open_browser(&self) -> Result<PageActor> {
        let (session, page) = match self.config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port).await?,
            None => {
                browser::launch_browser(
                    self.config.headless,
                    self.config.chrome_executable.as_deref(),
                )
                .await?
            }
        };

        let actor = PageActor::open(
            session,
            JsExecutor::new(page),
            &self.config.pdf_save_path,
            PageActorSettings::default(),
        )
        .await?;
        info!("✓ 浏览器会话已就绪");
        Ok(actor)
    }
}
