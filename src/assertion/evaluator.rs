use crate::assertion::diff::json_diff;
use crate::assertion::extractor::extract_value;
use crate::assertion::types::{AssertError, AssertExpr, Expectation, MatchMode};
use crate::http::Response;

/// 检查单条期望
pub fn check(response: &Response, expectation: &Expectation) -> Result<(), AssertError> {
    match expectation {
        Expectation::Status(expected) => {
            let actual = response.status.code();
            if actual == *expected {
                Ok(())
            } else {
                Err(AssertError::StatusMismatch {
                    expected: *expected,
                    actual,
                })
            }
        }

        Expectation::Json(expected) => check_json(response, expected, MatchMode::Exact),

        Expectation::JsonLike(expected) => check_json(response, expected, MatchMode::Subset),

        Expectation::Header { name, value } => {
            let actual = response.header(name);
            if actual == Some(value.as_str()) {
                Ok(())
            } else {
                Err(AssertError::HeaderMismatch {
                    name: name.clone(),
                    expected: value.clone(),
                    actual: actual.map(|s| s.to_string()),
                })
            }
        }

        Expectation::Expr(expr) => check_expr(response, expr),
    }
}

fn check_json(
    response: &Response,
    expected: &serde_json::Value,
    mode: MatchMode,
) -> Result<(), AssertError> {
    let actual = response.json().ok_or(AssertError::BodyNotJson)?;
    let mismatches = json_diff(expected, actual, mode);
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(AssertError::JsonMismatch { mode, mismatches })
    }
}

fn check_expr(response: &Response, assertion: &AssertExpr) -> Result<(), AssertError> {
    match assertion {
        AssertExpr::Compare { left, op, right } => {
            // 提取实际值
            let actual_value = extract_value(response, left)?;

            // 比较值
            if actual_value.compare(*op, right)? {
                Ok(())
            } else {
                Err(AssertError::Failed(format!(
                    "Expected {} to be {} {}, but got {}",
                    left, op, right, actual_value
                )))
            }
        }

        AssertExpr::Exists { path } => match extract_value(response, path) {
            Ok(_) => Ok(()),
            // 对象和数组无法比较，但确实存在
            Err(AssertError::ExtractionError(_)) => Ok(()),
            Err(_) => Err(AssertError::Failed(format!(
                "Expected {} to exist, but it was not found",
                path
            ))),
        },
    }
}
