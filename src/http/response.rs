use std::time::Duration;

use reqwest::header::HeaderMap as Headers;
use serde_json::Value;

use crate::Result;
use crate::assertion::{ValuePath, extract_json};
use crate::http::types::Status;

/// 响应体：能解析成 JSON 时保存解析结果，否则保留原始字节
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Raw(Vec<u8>),
}

impl Body {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Body::Empty;
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Raw(bytes),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Body::Empty => String::new(),
            Body::Json(value) => value.to_string(),
            Body::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Body::Empty => 0,
            Body::Json(value) => value.to_string().len(),
            Body::Raw(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: Body,
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: Vec<u8>, duration: Duration) -> Result<Self> {
        Ok(Self {
            status: Status::new(status)?,
            headers,
            body: Body::from_bytes(body),
            duration,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// 按名称读取 header（大小写不敏感），非 UTF-8 值视为不存在
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Option<&Value> {
        self.body.json()
    }

    /// 按路径提取值，例如 `body[0].id`、`res.body`、`headers.location`
    pub fn returns(&self, path: &str) -> Result<Value> {
        let value_path = ValuePath::parse(path).map_err(|e| extraction_error(path, e))?;
        extract_json(self, &value_path).map_err(|e| extraction_error(path, e))
    }
}

fn extraction_error(path: &str, err: impl std::fmt::Display) -> crate::HarnessError {
    crate::HarnessError::Extraction {
        path: path.to_string(),
        reason: err.to_string(),
    }
}
