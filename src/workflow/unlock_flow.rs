//! 单本手稿的界面流程 - 流程层
//!
//! 只描述"在页面上怎么做"，代码从哪里来由编排层决定。

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::config::LoginSettings;
use crate::error::UiResult;
use crate::infrastructure::{CredentialField, ElementTarget, Locator, UiActor};
use crate::models::{Resource, UnlockCode};
use crate::workflow::policy::{
    StepPolicy, Timeouts, DOCUMENTATION_DIALOG, DOWNLOAD, LOGIN, SECONDARY_LISTING, SUBMIT_CODE,
    SUCCESS_DIALOG,
};
use crate::workflow::step_ctx::StepCtx;

const CODE_PLACEHOLDER: &str = "Ingresá el código";
const UNLOCK_BUTTON: &str = "Desbloquear";
const DOWNLOAD_BUTTON: &str = "Descargar PDF";
const DOCUMENTATION_BUTTON: &str = "Ver Documentación";
const CLOSE_MODAL_LABEL: &str = "Cerrar modal";
const SUCCESS_TEXT: &str = "¡Manuscrito Desbloqueado!";
const CLOSE_BUTTON: &str = "Cerrar";
const SECONDARY_PAGE_BUTTON: &str = "2";

/// 解锁后的停顿
#[derive(Debug, Clone)]
pub struct SettleDelays {
    /// 普通解锁后
    pub unlock: Duration,
    /// 挑战解锁后
    pub challenge_unlock: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            unlock: Duration::from_millis(1000),
            challenge_unlock: Duration::from_millis(500),
        }
    }
}

/// 单本手稿的界面流程
pub struct UnlockFlow {
    timeouts: Timeouts,
    delays: SettleDelays,
}

impl UnlockFlow {
    pub fn new(timeouts: Timeouts, delays: SettleDelays) -> Self {
        Self { timeouts, delays }
    }

    /// 登录并等待跳转
    pub async fn login(&self, ui: &dyn UiActor, settings: &LoginSettings) -> UiResult<()> {
        LOGIN
            .guard(async {
                ui.navigate(&settings.url).await?;
                ui.fill_credential(CredentialField::Email, &settings.email).await?;
                ui.fill_credential(CredentialField::Password, &settings.password)
                    .await?;
                ui.submit_login().await
            })
            .await?;
        info!("✓ 登录成功");
        Ok(())
    }

    /// 切换到第二页列表，失败只记警告
    pub async fn open_secondary_listing(&self, ui: &dyn UiActor) -> UiResult<bool> {
        let button = ElementTarget::page(Locator::ButtonExact(SECONDARY_PAGE_BUTTON.to_string()));
        let switched = SECONDARY_LISTING
            .guard(async {
                ui.wait_for_element_visible(&button, self.timeouts.secondary_listing)
                    .await?;
                ui.click(&button).await?;
                ui.wait_for_idle(self.timeouts.secondary_listing).await
            })
            .await?;
        if switched.is_some() {
            info!("📄 已切换到第二页");
        }
        Ok(switched.is_some())
    }

    /// 普通解锁：填代码 → 等按钮可用 → 点击
    pub async fn unlock(&self, ui: &dyn UiActor, ctx: &StepCtx, code: &UnlockCode) -> UiResult<()> {
        let container = ui.locate_resource_container(&ctx.title).await?;
        let input = container.find(Locator::InputPlaceholder(CODE_PLACEHOLDER.to_string()));
        let button = container.find(Locator::ButtonText(UNLOCK_BUTTON.to_string()));

        SUBMIT_CODE
            .guard(async {
                ui.wait_for_element_visible(&input, self.timeouts.input_visible)
                    .await?;
                ui.fill_input(&input, code.as_str()).await?;
                ui.wait_for_element_enabled(&button, self.timeouts.unlock_enabled)
                    .await?;
                ui.click(&button).await
            })
            .await?;

        pause(self.delays.unlock).await;
        info!("{} 🔓 已解锁", ctx);
        Ok(())
    }

    /// 挑战解锁：先关说明弹窗，提交后再关成功弹窗
    pub async fn unlock_with_challenge(
        &self,
        ui: &dyn UiActor,
        ctx: &StepCtx,
        code: &UnlockCode,
    ) -> UiResult<()> {
        let container = ui.locate_resource_container(&ctx.title).await?;

        let docs_button = container.find(Locator::ButtonText(DOCUMENTATION_BUTTON.to_string()));
        if ui.is_present(&docs_button).await? {
            self.dismiss_documentation(ui, ctx, &docs_button).await?;
        }

        let input = container.find(Locator::InputPlaceholder(CODE_PLACEHOLDER.to_string()));
        let button = container.find(Locator::ButtonText(UNLOCK_BUTTON.to_string()));

        SUBMIT_CODE
            .guard(async {
                ui.wait_for_element_visible(&input, self.timeouts.challenge_input_visible)
                    .await?;
                ui.fill_input(&input, code.as_str()).await?;
                ui.wait_for_element_visible(&button, self.timeouts.challenge_unlock_visible)
                    .await?;
                ui.wait_for_element_enabled(&button, self.timeouts.challenge_unlock_enabled)
                    .await?;
                ui.click(&button).await
            })
            .await?;

        self.dismiss_dialog(
            ui,
            SUCCESS_DIALOG,
            &ElementTarget::page(Locator::DialogWithText(SUCCESS_TEXT.to_string())),
            Locator::ButtonText(CLOSE_BUTTON.to_string()),
        )
        .await?;

        pause(self.delays.challenge_unlock).await;
        info!("{} 🔓 已通过挑战解锁", ctx);
        Ok(())
    }

    async fn dismiss_documentation(
        &self,
        ui: &dyn UiActor,
        ctx: &StepCtx,
        docs_button: &ElementTarget,
    ) -> UiResult<()> {
        ui.click(docs_button).await?;
        info!("{} 点击了 \"{}\"", ctx, DOCUMENTATION_BUTTON);

        self.dismiss_dialog(
            ui,
            DOCUMENTATION_DIALOG,
            &ElementTarget::page(Locator::Dialog),
            Locator::ButtonLabel(CLOSE_MODAL_LABEL.to_string()),
        )
        .await
    }

    /// 等弹窗出现 → 点关闭 → 等弹窗消失
    async fn dismiss_dialog(
        &self,
        ui: &dyn UiActor,
        policy: StepPolicy,
        dialog: &ElementTarget,
        close: Locator,
    ) -> UiResult<()> {
        let close_button = dialog.find(close);
        let closed = policy
            .guard(async {
                ui.wait_for_dialog(dialog, self.timeouts.dialog).await?;
                ui.close_dialog(&close_button).await?;
                ui.wait_for_dialog_hidden(dialog, self.timeouts.dialog).await
            })
            .await?;
        if closed.is_some() {
            info!("✓ {}", policy.label);
        }
        Ok(())
    }

    /// 点击下载并保存到 `<save_dir>/manuscrito-<标题>.pdf`
    pub async fn download(
        &self,
        ui: &dyn UiActor,
        resource: &Resource,
        save_dir: &Path,
    ) -> UiResult<PathBuf> {
        let container = ui.locate_resource_container(&resource.title).await?;
        let button = container.find(Locator::ButtonText(DOWNLOAD_BUTTON.to_string()));
        let destination = resource.document_path(save_dir);

        let saved = DOWNLOAD
            .guard(async {
                ui.wait_for_element_visible(&button, self.timeouts.download_visible)
                    .await?;
                ui.wait_for_element_enabled(&button, self.timeouts.download_enabled)
                    .await?;
                ui.trigger_download_and_save(&button, &destination).await
            })
            .await?;

        // 非容忍步骤成功时必然有值
        Ok(saved.unwrap_or(destination))
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
