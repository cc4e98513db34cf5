use serde_json::Value;

use crate::assertion::types::{AssertError, AssertValue, PathSegment, ValuePath};
use crate::http::Response;

/// 从响应中提取值（用于比较断言）
pub fn extract_value(response: &Response, path: &ValuePath) -> Result<AssertValue, AssertError> {
    match path {
        ValuePath::Status => Ok(AssertValue::Number(response.status.code() as f64)),

        ValuePath::Header(name) => Ok(AssertValue::String(header_value(response, name)?)),

        ValuePath::Body(segments) => {
            let body = response.json().ok_or(AssertError::BodyNotJson)?;
            json_value_to_assert_value(walk(body, segments)?)
        }

        ValuePath::ResponseTime => Ok(AssertValue::Number(response.duration.as_millis() as f64)),
    }
}

/// 从响应中提取原始 JSON 值（用于 `returns` 与变量捕获）
pub fn extract_json(response: &Response, path: &ValuePath) -> Result<Value, AssertError> {
    match path {
        ValuePath::Status => Ok(Value::from(response.status.code())),
        ValuePath::Header(name) => Ok(Value::String(header_value(response, name)?)),
        ValuePath::Body(segments) => {
            let body = response.json().ok_or(AssertError::BodyNotJson)?;
            walk(body, segments).cloned()
        }
        ValuePath::ResponseTime => Ok(Value::from(response.duration.as_millis() as u64)),
    }
}

fn header_value(response: &Response, name: &str) -> Result<String, AssertError> {
    let value = response
        .headers
        .get(name)
        .ok_or_else(|| AssertError::PathNotFound(format!("Header '{}' not found", name)))?;
    // HeaderValue 转换为 String
    value.to_str().map(|s| s.to_string()).map_err(|e| {
        AssertError::ExtractionError(format!("Failed to convert header value to string: {}", e))
    })
}

/// 沿路径段逐级查找
///
/// 对数组使用数字形式的 key（`body.0.id`）也视为下标
fn walk<'a>(root: &'a Value, segments: &[PathSegment]) -> Result<&'a Value, AssertError> {
    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        let next = match (segment, current) {
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            (PathSegment::Key(key), Value::Array(items)) => {
                key.parse::<usize>().ok().and_then(|index| items.get(index))
            }
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            _ => None,
        };
        current = next.ok_or_else(|| {
            AssertError::PathNotFound(format!(
                "Path '{}' not found",
                ValuePath::Body(segments[..=depth].to_vec())
            ))
        })?;
    }
    Ok(current)
}

/// 将 serde_json::Value 转换为 AssertValue
fn json_value_to_assert_value(value: &Value) -> Result<AssertValue, AssertError> {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                Ok(AssertValue::Number(f))
            } else {
                Err(AssertError::ExtractionError(
                    "Number cannot be represented as f64".to_string(),
                ))
            }
        }
        Value::String(s) => Ok(AssertValue::String(s.clone())),
        Value::Bool(b) => Ok(AssertValue::Bool(*b)),
        Value::Null => Ok(AssertValue::Null),
        Value::Array(_) | Value::Object(_) => Err(AssertError::ExtractionError(
            "Cannot compare arrays or objects directly".to_string(),
        )),
    }
}
