use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};
use reqwest::header::{CONTENT_TYPE, HeaderMap as Headers, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::http::types::Method;
use crate::{HarnessError, Result};

/// 已构建完成的请求，构建后不可修改
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: url::Url,
    pub headers: Headers,
    pub body: Option<Value>,
    /// None 时使用 Client 的默认超时
    pub timeout: Option<Duration>,
}

impl Request {
    /// `GET https://host/path`，用于日志和报告
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// 请求构建器
///
/// URL 中的 `{name}` 占位符在 `build` 时用路径参数替换：
///
/// ```
/// use mercado_contract::http::{Method, RequestBuilder};
///
/// let request = RequestBuilder::new(Method::Get, "https://example.com/mercado/{id}")
///     .with_path_param("id", 7)
///     .build()
///     .unwrap();
/// assert_eq!(request.url.as_str(), "https://example.com/mercado/7");
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    template: String,
    path_params: HashMap<String, String>,
    query_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    pub fn new(method: Method, url_template: impl Into<String>) -> Self {
        Self {
            method,
            template: url_template.into(),
            path_params: HashMap::new(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn with_path_param(mut self, name: &str, value: impl ToString) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }

    /// 同名参数会被覆盖
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query_params.retain(|(k, _)| k != key);
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(data)?);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Request> {
        let resolved = resolve_template(&self.template, &self.path_params)?;
        let mut url = url::Url::parse(&resolved)
            .map_err(|e| HarnessError::InvalidUrl(format!("{}: {}", resolved, e)))?;

        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query_params);
        }

        let mut headers = Headers::new();
        for (key, value) in &self.headers {
            let name: HeaderName = key
                .parse()
                .map_err(|_| HarnessError::ParseError(format!("Invalid header name: {}", key)))?;
            let value: HeaderValue = value.parse().map_err(|_| {
                HarnessError::ParseError(format!("Invalid header value for {}: {}", key, value))
            })?;
            headers.insert(name, value);
        }
        if self.body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(Request {
            method: self.method,
            url,
            headers,
            body: self.body,
            timeout: self.timeout,
        })
    }
}

/// 替换 `{name}` 占位符，缺少参数时报错
fn resolve_template(template: &str, params: &HashMap<String, String>) -> Result<String> {
    static PARAM_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = PARAM_REGEX.get_or_init(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

    let mut missing = Vec::new();
    let resolved = re
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                missing.push(caps[1].to_string());
                caps[0].to_string()
            }
        })
        .to_string();

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(HarnessError::Template(format!(
            "missing path param(s) {} in {}",
            missing.join(", "),
            template
        )))
    }
}
