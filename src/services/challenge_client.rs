//! 挑战服务 - 业务能力层
//!
//! 用"书名 + 上一个代码"向远程服务换取挑战描述，再在本地解出新代码。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, ChallengeError, ConfigError};
use crate::models::{ChallengeDescriptor, UnlockCode};

/// 挑战服务的环境变量名
pub const CHALLENGE_URL_VAR: &str = "URL_API_CHALLENGE";

/// 请求超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 挑战来源
#[async_trait]
pub trait ChallengeSource: Send + Sync {
    async fn fetch_challenge(
        &self,
        resource_title: &str,
        previous_code: &UnlockCode,
    ) -> Result<ChallengeDescriptor, AppError>;
}

/// 按 targets 顺序拼接 vault 片段
///
/// 越界索引直接报错，不做截断。
pub fn resolve_challenge(descriptor: &ChallengeDescriptor) -> Result<String, ChallengeError> {
    let vault_len = descriptor.vault.len();
    descriptor
        .targets
        .iter()
        .map(|&target| {
            descriptor
                .vault
                .get(target)
                .map(String::as_str)
                .ok_or(ChallengeError::TargetOutOfRange { target, vault_len })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChallengeEnvelope {
    #[serde(default)]
    success: bool,
    challenge: Option<ChallengeDescriptor>,
}

/// 基于 reqwest 的挑战服务客户端
pub struct ChallengeClient {
    client: Client,
    base_url: Option<String>,
}

impl ChallengeClient {
    /// `base_url` 为空时不会立即报错，第一次请求时才报告配置缺失
    pub fn new(base_url: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ChallengeError::Transport {
                title: String::new(),
                source,
            })?;
        Ok(Self { client, base_url })
    }

    fn request_url(&self, resource_title: &str, previous_code: &UnlockCode) -> Result<Url, ConfigError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| ConfigError::missing(CHALLENGE_URL_VAR))?;
        let mut url = Url::parse(base).map_err(|_| ConfigError::InvalidValue {
            var_name: CHALLENGE_URL_VAR.to_string(),
            value: base.to_string(),
            expected_type: "URL".to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("bookTitle", resource_title)
            .append_pair("unlockCode", previous_code.as_str());
        Ok(url)
    }
}

#[async_trait]
impl ChallengeSource for ChallengeClient {
    async fn fetch_challenge(
        &self,
        resource_title: &str,
        previous_code: &UnlockCode,
    ) -> Result<ChallengeDescriptor, AppError> {
        let url = self.request_url(resource_title, previous_code)?;
        info!("🌐 请求 \"{}\" 的挑战...", resource_title);
        debug!("挑战请求: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ChallengeError::Transport {
                title: resource_title.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChallengeError::RemoteStatus {
                title: resource_title.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let envelope: ChallengeEnvelope =
            response
                .json()
                .await
                .map_err(|e| ChallengeError::InvalidResponse {
                    title: resource_title.to_string(),
                    reason: e.to_string(),
                })?;

        if !envelope.success {
            return Err(ChallengeError::InvalidResponse {
                title: resource_title.to_string(),
                reason: "success 不为 true".to_string(),
            }
            .into());
        }

        let descriptor = envelope.challenge.ok_or_else(|| ChallengeError::InvalidResponse {
            title: resource_title.to_string(),
            reason: "缺少 challenge".to_string(),
        })?;
        debug!(
            "挑战描述: vault {} 项, targets {:?}",
            descriptor.vault.len(),
            descriptor.targets
        );
        Ok(descriptor)
    }
}
