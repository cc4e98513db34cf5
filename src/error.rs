use thiserror::Error;

use crate::assertion::AssertError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("网络错误: {method} {url}: {message}")]
    Network {
        method: String,
        url: String,
        message: String,
    },

    #[error("请求超时: {method} {url} ({timeout_ms}ms)")]
    Timeout {
        method: String,
        url: String,
        timeout_ms: u64,
    },

    #[error("{0}")]
    Assertion(#[from] AssertionFailure),

    #[error("提取失败 '{path}': {reason}")]
    Extraction { path: String, reason: String },

    #[error("fixture '{0}' 在写入前被读取")]
    UninitializedFixture(String),

    #[error("fixture '{0}' 已经写入过")]
    FixtureAlreadySet(String),

    #[error("URL 模板错误: {0}")]
    Template(String),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for HarnessError {
    fn from(err: anyhow::Error) -> Self {
        HarnessError::Other(err.to_string())
    }
}

/// 一次请求上所有未通过的断言
#[derive(Error, Debug)]
#[error("{request}: {}", format_errors(.errors))]
pub struct AssertionFailure {
    /// `METHOD url`
    pub request: String,
    pub errors: Vec<AssertError>,
}

fn format_errors(errors: &[AssertError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for mercado-contract crate
pub type Result<T> = std::result::Result<T, HarnessError>;
