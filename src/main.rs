use std::process::ExitCode;

use anyhow::Result;
use manuscript_unlock::utils::logging;
use manuscript_unlock::{App, Config};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env 不存在时直接使用进程环境
    let _ = dotenvy::dotenv();

    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let state = App::initialize(config).await?.run().await?;

    if state.is_completed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
