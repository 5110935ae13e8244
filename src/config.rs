use std::path::PathBuf;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 登录页 URL
    pub login_url: Option<String>,
    /// 账号邮箱
    pub email: Option<String>,
    /// 账号密码
    pub password: Option<String>,
    /// 挑战服务基础 URL（到达需要挑战的手稿时才必需）
    pub challenge_api_url: Option<String>,
    /// PDF 保存目录
    pub pdf_save_path: PathBuf,
    /// 是否无头模式启动浏览器
    pub headless: bool,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<PathBuf>,
    /// 连接已运行浏览器的调试端口（设置后不再自行启动）
    pub browser_debug_port: Option<u16>,
    /// 自定义手稿清单（TOML）
    pub catalog_file: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// 登录所需的三项配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginSettings {
    pub url: String,
    pub email: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: None,
            email: None,
            password: None,
            challenge_api_url: None,
            pdf_save_path: PathBuf::from("./"),
            headless: false,
            chrome_executable: None,
            browser_debug_port: None,
            catalog_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let default = Self::default();

        Ok(Self {
            login_url: get("URL_LOGIN"),
            email: get("EMAIL"),
            password: get("PASSWORD"),
            challenge_api_url: get("URL_API_CHALLENGE"),
            pdf_save_path: get("PDF_SAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.pdf_save_path),
            headless: parse_var("HEADLESS", get("HEADLESS"), "bool")?.unwrap_or(default.headless),
            chrome_executable: get("CHROME_EXECUTABLE").map(PathBuf::from),
            browser_debug_port: parse_var("BROWSER_DEBUG_PORT", get("BROWSER_DEBUG_PORT"), "u16")?,
            catalog_file: get("CATALOG_FILE").map(PathBuf::from),
            verbose_logging: parse_var("VERBOSE_LOGGING", get("VERBOSE_LOGGING"), "bool")?
                .unwrap_or(default.verbose_logging),
        })
    }

    /// 校验登录配置，缺任何一项都是启动期致命错误
    pub fn login_settings(&self) -> Result<LoginSettings, ConfigError> {
        let url = self.login_url.clone().ok_or_else(|| ConfigError::missing("URL_LOGIN"))?;
        let email = self.email.clone().ok_or_else(|| ConfigError::missing("EMAIL"))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| ConfigError::missing("PASSWORD"))?;
        Ok(LoginSettings {
            url,
            email,
            password,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    raw: Option<String>,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.pdf_save_path, PathBuf::from("./"));
        assert!(!config.headless);
        assert!(config.challenge_api_url.is_none());
        assert!(config.browser_debug_port.is_none());
    }

    #[test]
    fn test_reads_all_settings() {
        let config = Config::from_lookup(lookup(&[
            ("URL_LOGIN", "https://example.test/login"),
            ("EMAIL", "monje@example.test"),
            ("PASSWORD", "secreto"),
            ("URL_API_CHALLENGE", "https://api.example.test/challenge"),
            ("PDF_SAVE_PATH", "/tmp/manuscritos"),
            ("HEADLESS", "true"),
            ("BROWSER_DEBUG_PORT", "9222"),
        ]))
        .unwrap();

        let login = config.login_settings().unwrap();
        assert_eq!(login.email, "monje@example.test");
        assert_eq!(config.pdf_save_path, PathBuf::from("/tmp/manuscritos"));
        assert!(config.headless);
        assert_eq!(config.browser_debug_port, Some(9222));
    }

    #[test]
    fn test_missing_password_is_reported_by_name() {
        let config = Config::from_lookup(lookup(&[
            ("URL_LOGIN", "https://example.test/login"),
            ("EMAIL", "monje@example.test"),
            ("PASSWORD", "   "),
        ]))
        .unwrap();

        match config.login_settings() {
            Err(ConfigError::MissingVar { var_name }) => assert_eq!(var_name, "PASSWORD"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_flag_is_rejected() {
        let err = Config::from_lookup(lookup(&[("HEADLESS", "quizas")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var_name, .. } if var_name == "HEADLESS"));
    }
}
