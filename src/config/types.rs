use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::http::DEFAULT_TIMEOUT;

/// 默认被测服务
pub const DEFAULT_BASE_URL: &str = "https://api-desafio-qa.onrender.com";

/// 单个环境的配置
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Environment {
    pub base_url: Option<String>,

    /// 单个请求的超时（毫秒）
    pub timeout_ms: Option<u64>,

    /// JSON 报告输出路径
    pub report_path: Option<PathBuf>,

    /// 每个请求都带上的 header
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// 完整的配置文件
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// 未指定环境时使用
    pub default_env: Option<String>,

    /// 所有环境配置
    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

impl ConfigFile {
    /// 获取指定环境
    pub fn get_environment(&self, env_name: &str) -> Option<&Environment> {
        self.environments.get(env_name)
    }
}

/// 解析完成、可直接使用的设置
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub report_path: Option<PathBuf>,
    pub headers: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            report_path: None,
            headers: HashMap::new(),
        }
    }
}
