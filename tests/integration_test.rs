use std::time::Duration;

use manuscript_unlock::browser::launch_browser;
use manuscript_unlock::config::Config;
use manuscript_unlock::infrastructure::{JsExecutor, PageActor, PageActorSettings, UiActor};
use manuscript_unlock::utils::logging;
use manuscript_unlock::App;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_full_unlock_run() {
    // 初始化日志
    logging::init(true);

    // 加载配置（需要 URL_LOGIN / EMAIL / PASSWORD / URL_API_CHALLENGE）
    let _ = dotenvy::dotenv();
    let config = Config::from_env().expect("读取配置失败");

    let state = App::initialize(config)
        .await
        .expect("初始化失败")
        .run()
        .await
        .expect("运行失败");

    assert!(state.is_completed(), "流程应该完成: {:?}", state.status);
}

#[tokio::test]
#[ignore]
async fn test_browser_session_lifecycle() {
    logging::init(true);

    let dir = tempfile::TempDir::new().unwrap();
    let (session, page) = launch_browser(true, None).await.expect("启动浏览器失败");
    let actor = PageActor::open(
        session,
        JsExecutor::new(page),
        dir.path(),
        PageActorSettings::default(),
    )
    .await
    .expect("接管会话失败");

    actor
        .wait_for_idle(Duration::from_secs(5))
        .await
        .expect("空白页应该加载完成");
    assert!(dir.path().join(".descargas").exists());

    actor.release().await.expect("释放会话失败");
    // 二次释放只记警告
    assert!(actor.release().await.is_ok());
    assert!(actor.wait_for_idle(Duration::from_secs(1)).await.is_err());
}
