use serde_json::Value;

use crate::assertion::{ValuePath, extract_json};
use crate::http::Response;
use crate::{HarnessError, Result};

/// 变量捕获来源
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureSource {
    /// 从响应 Body 提取
    /// 示例: body[0].id, body.user.id
    Body(ValuePath),

    /// 从响应 Header 提取
    /// 示例: headers.location
    Header(String),
}

/// 把响应中的某个值保存为 fixture
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// fixture 名称
    pub name: String,

    /// 捕获来源
    pub source: CaptureSource,
}

impl Capture {
    /// 从 Header 提取
    pub fn from_header(name: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: CaptureSource::Header(header_name.into()),
        }
    }

    /// 解析捕获源字符串
    ///
    /// 语法:
    /// - `body[0].id` → CaptureSource::Body
    /// - `res.body.user.id` → CaptureSource::Body
    /// - `headers.location` → CaptureSource::Header("location")
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let path = ValuePath::parse(source).map_err(|e| HarnessError::Extraction {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
        let source = match path {
            ValuePath::Header(header) => CaptureSource::Header(header),
            ValuePath::Body(_) => CaptureSource::Body(path),
            other => {
                return Err(HarnessError::Extraction {
                    path: source.to_string(),
                    reason: format!("cannot capture {} into a fixture", other),
                });
            }
        };

        Ok(Self {
            name: name.to_string(),
            source,
        })
    }

    /// 从响应中提取捕获的值
    pub fn extract(&self, response: &Response) -> Result<Value> {
        let path = match &self.source {
            CaptureSource::Body(path) => path.clone(),
            CaptureSource::Header(header) => ValuePath::Header(header.clone()),
        };
        extract_json(response, &path).map_err(|e| HarnessError::Extraction {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

}
