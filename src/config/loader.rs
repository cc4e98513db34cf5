use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::config::types::{ConfigFile, Settings};
use crate::{HarnessError, Result};

/// 选择环境的环境变量
pub const ENV_SELECTOR: &str = "MERCADO_ENV";
/// 覆盖 base_url 的环境变量（优先级最高）
pub const BASE_URL_OVERRIDE: &str = "MERCADO_BASE_URL";

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "mercado.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ConfigFile> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            HarnessError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| HarnessError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/mercado-contract/
    ///
    /// 找不到文件时返回 `Ok(None)`；文件存在但无法读取或解析时返回错误
    pub fn find_and_load() -> Result<Option<ConfigFile>> {
        match Self::find_config_path() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load_from_path(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn find_config_path() -> Option<PathBuf> {
        std::env::current_dir()
            .ok()
            .and_then(|dir| Self::search_upwards(&dir))
            .or_else(Self::user_config_path)
    }

    /// 从 `start` 开始逐级向上查找
    fn search_upwards(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(Self::CONFIG_FILE))
            .find(|path| path.exists())
    }

    fn user_config_path() -> Option<PathBuf> {
        let config_path = dirs::home_dir()?
            .join(".config")
            .join("mercado-contract")
            .join(Self::CONFIG_FILE);
        config_path.exists().then_some(config_path)
    }

    /// 根据进程环境得到最终设置
    ///
    /// 没有配置文件时使用默认设置；`MERCADO_ENV` 选择环境，`MERCADO_BASE_URL` 覆盖 base_url
    pub fn load() -> Result<Settings> {
        let config = Self::find_and_load()?.unwrap_or_default();
        let env_name = std::env::var(ENV_SELECTOR).ok();
        let base_url = std::env::var(BASE_URL_OVERRIDE).ok();
        let settings = Self::build_settings(&config, env_name.as_deref(), base_url.as_deref())?;
        info!(base_url = %settings.base_url, timeout_ms = settings.timeout.as_millis() as u64, "settings loaded");
        Ok(settings)
    }

    /// 合并配置：默认值 < 配置文件环境 < base_url 覆盖
    pub fn build_settings(
        config: &ConfigFile,
        env_name: Option<&str>,
        base_url_override: Option<&str>,
    ) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(name) = env_name.or(config.default_env.as_deref()) {
            let env = config
                .get_environment(name)
                .ok_or_else(|| HarnessError::Config(format!("Unknown environment: {}", name)))?;

            if let Some(base_url) = &env.base_url {
                settings.base_url = resolve_env_vars(base_url);
            }
            if let Some(timeout_ms) = env.timeout_ms {
                settings.timeout = Duration::from_millis(timeout_ms);
            }
            settings.report_path = env.report_path.clone();
            for (key, value) in &env.headers {
                settings.headers.insert(key.clone(), resolve_env_vars(value));
            }
        }

        if let Some(base_url) = base_url_override {
            settings.base_url = base_url.to_string();
        }

        let trimmed = settings.base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&trimmed)
            .map_err(|e| HarnessError::Config(format!("Invalid base_url {}: {}", trimmed, e)))?;
        settings.base_url = trimmed;

        Ok(settings)
    }
}

/// 解析并替换系统环境变量 ${VAR}，未设置的保持原样
pub fn resolve_env_vars(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

    re.replace_all(text, |caps: &Captures| {
        let env_name = &caps[1];
        std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .to_string()
}
