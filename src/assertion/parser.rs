use crate::assertion::types::{
    AssertError, AssertExpr, AssertValue, CompareOp, PathSegment, ValuePath,
};

/// 解析断言表达式
///
/// 支持的格式：
/// - `status == 200`
/// - `headers.content-type contains "json"`
/// - `body[0].id > 0`
/// - `body.errors[1].path == "cnpj"`
/// - `response.time < 1000`
/// - `body.token exists`
pub fn parse_assertion(input: &str) -> Result<AssertExpr, AssertError> {
    let input = input.trim();

    // 检查是否是 exists 断言
    if let Some(path_str) = input.strip_suffix("exists") {
        let path_str = path_str.trim();
        if path_str.is_empty() {
            return Err(AssertError::InvalidSyntax(
                "Left side of assertion is empty".to_string(),
            ));
        }
        let path = parse_value_path(path_str)?;
        return Ok(AssertExpr::Exists { path });
    }

    // 路径中不含空白和比较字符，左值到此为止
    let left_end = input
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '!' | '<' | '>'))
        .unwrap_or(input.len());
    let left_str = &input[..left_end];
    let rest = input[left_end..].trim_start();

    if left_str.is_empty() {
        return Err(AssertError::InvalidSyntax(
            "Left side of assertion is empty".to_string(),
        ));
    }

    let op_str = CompareOp::ALL
        .iter()
        .find(|op| rest.starts_with(*op))
        .ok_or_else(|| {
            AssertError::InvalidSyntax(format!("No valid operator found in assertion: {}", input))
        })?;

    let op = CompareOp::parse(op_str)
        .ok_or_else(|| AssertError::InvalidOperator(format!("Invalid operator: {}", op_str)))?;

    let right_str = rest[op_str.len()..].trim();
    if right_str.is_empty() {
        return Err(AssertError::InvalidSyntax(
            "Right side of assertion is empty".to_string(),
        ));
    }

    let left = parse_value_path(left_str)?;
    let right = parse_assert_value(right_str);

    Ok(AssertExpr::Compare { left, op, right })
}

/// 解析值路径
///
/// 允许 pactum 风格的 `res.` 前缀，例如 `res.body[0].id`
pub fn parse_value_path(input: &str) -> Result<ValuePath, AssertError> {
    let input = input.trim();
    let input = input.strip_prefix("res.").unwrap_or(input);

    if input == "status" {
        return Ok(ValuePath::Status);
    }

    if input == "response.time" {
        return Ok(ValuePath::ResponseTime);
    }

    if let Some(rest) = input
        .strip_prefix("headers.")
        .or_else(|| input.strip_prefix("header."))
    {
        if rest.is_empty() {
            return Err(AssertError::InvalidSyntax(
                "Header name cannot be empty".to_string(),
            ));
        }
        return Ok(ValuePath::Header(rest.to_string()));
    }

    if let Some(rest) = input.strip_prefix("body")
        && (rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
    {
        return Ok(ValuePath::Body(parse_segments(rest, input)?));
    }

    Err(AssertError::InvalidSyntax(format!(
        "Invalid value path: {}. Must start with 'status', 'headers.', 'body' or 'response.time'",
        input
    )))
}

/// 解析 `.key[0].other` 形式的路径段
fn parse_segments(input: &str, full: &str) -> Result<Vec<PathSegment>, AssertError> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let mut key = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    key.push(next);
                    chars.next();
                }
                if key.is_empty() {
                    return Err(AssertError::InvalidSyntax(format!(
                        "Empty path segment in '{}'",
                        full
                    )));
                }
                segments.push(PathSegment::Key(key));
            }
            '[' => {
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(next) => index.push(next),
                        None => {
                            return Err(AssertError::InvalidSyntax(format!(
                                "Unclosed '[' in '{}'",
                                full
                            )));
                        }
                    }
                }
                let index = index.trim().parse::<usize>().map_err(|_| {
                    AssertError::InvalidSyntax(format!("Invalid array index '{}' in '{}'", index, full))
                })?;
                segments.push(PathSegment::Index(index));
            }
            other => {
                return Err(AssertError::InvalidSyntax(format!(
                    "Unexpected character '{}' in '{}'",
                    other, full
                )));
            }
        }
    }

    Ok(segments)
}

/// 解析断言值（右值）
fn parse_assert_value(input: &str) -> AssertValue {
    let input = input.trim();

    // Null
    if input == "null" {
        return AssertValue::Null;
    }

    // 布尔值
    if input == "true" {
        return AssertValue::Bool(true);
    }
    if input == "false" {
        return AssertValue::Bool(false);
    }

    // 字符串（带引号）
    if input.len() >= 2
        && ((input.starts_with('"') && input.ends_with('"'))
            || (input.starts_with('\'') && input.ends_with('\'')))
    {
        let s = &input[1..input.len() - 1];
        return AssertValue::String(s.to_string());
    }

    // 数字
    if let Ok(n) = input.parse::<f64>() {
        return AssertValue::Number(n);
    }

    // 未带引号的字符串（用于 contains 等）
    AssertValue::String(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn test_parse_status_assertion() {
        let expr = parse_assertion("status == 200").unwrap();
        assert_eq!(
            expr,
            AssertExpr::Compare {
                left: ValuePath::Status,
                op: CompareOp::Equal,
                right: AssertValue::Number(200.0),
            }
        );
    }

    #[test]
    fn test_parse_without_spaces() {
        let expr = parse_assertion("status>=200").unwrap();
        match expr {
            AssertExpr::Compare { op, right, .. } => {
                assert_eq!(op, CompareOp::GreaterOrEqual);
                assert_eq!(right, AssertValue::Number(200.0));
            }
            _ => panic!("Expected Compare assertion"),
        }
    }

    #[test]
    fn test_parse_header_assertion() {
        let expr = parse_assertion("headers.content-type contains \"json\"").unwrap();
        match expr {
            AssertExpr::Compare { left, op, right } => {
                assert_eq!(left, ValuePath::Header("content-type".to_string()));
                assert_eq!(op, CompareOp::Contains);
                assert_eq!(right, AssertValue::String("json".to_string()));
            }
            _ => panic!("Expected Compare assertion"),
        }
    }

    #[test]
    fn test_parse_indexed_body_path() {
        let expr = parse_assertion("body.errors[1].path == \"cnpj\"").unwrap();
        match expr {
            AssertExpr::Compare { left, right, .. } => {
                assert_eq!(
                    left,
                    ValuePath::Body(vec![key("errors"), PathSegment::Index(1), key("path")])
                );
                assert_eq!(right, AssertValue::String("cnpj".to_string()));
            }
            _ => panic!("Expected Compare assertion"),
        }
    }

    #[test]
    fn test_parse_value_containing_operator() {
        let expr = parse_assertion("body.msg == \"a >= b\"").unwrap();
        match expr {
            AssertExpr::Compare { op, right, .. } => {
                assert_eq!(op, CompareOp::Equal);
                assert_eq!(right, AssertValue::String("a >= b".to_string()));
            }
            _ => panic!("Expected Compare assertion"),
        }
    }

    #[test]
    fn test_parse_exists_assertion() {
        let expr = parse_assertion("body[0].id exists").unwrap();
        assert_eq!(
            expr,
            AssertExpr::Exists {
                path: ValuePath::Body(vec![PathSegment::Index(0), key("id")])
            }
        );
    }

    #[test]
    fn test_parse_value_path_variants() {
        assert_eq!(parse_value_path("res.body").unwrap(), ValuePath::Body(vec![]));
        assert_eq!(
            parse_value_path("res.body[0].id").unwrap(),
            ValuePath::Body(vec![PathSegment::Index(0), key("id")])
        );
        assert_eq!(
            parse_value_path("header.Location").unwrap(),
            ValuePath::Header("Location".to_string())
        );
        assert_eq!(parse_value_path("response.time").unwrap(), ValuePath::ResponseTime);
    }

    #[test]
    fn test_parse_value_path_errors() {
        assert!(parse_value_path("bodyx").is_err());
        assert!(parse_value_path("body.").is_err());
        assert!(parse_value_path("body[").is_err());
        assert!(parse_value_path("body[-1]").is_err());
        assert!(parse_value_path("headers.").is_err());
        assert!(parse_value_path("cookies.a").is_err());
    }

    #[test]
    fn test_parse_values() {
        let right = |s: &str| match parse_assertion(s).unwrap() {
            AssertExpr::Compare { right, .. } => right,
            _ => panic!("Expected Compare assertion"),
        };

        assert_eq!(right("body.count == 42"), AssertValue::Number(42.0));
        assert_eq!(right("body.name == 'test'"), AssertValue::String("test".to_string()));
        assert_eq!(right("body.active == true"), AssertValue::Bool(true));
        assert_eq!(right("body.data == null"), AssertValue::Null);
        assert_eq!(right("body.cnpj == \"123456\""), AssertValue::String("123456".to_string()));
    }

    #[test]
    fn test_parse_invalid_syntax() {
        assert!(parse_assertion("invalid").is_err());
        assert!(parse_assertion("status").is_err());
        assert!(parse_assertion("== 200").is_err());
        assert!(parse_assertion("status ==").is_err());
        assert!(parse_assertion("exists").is_err());
    }
}
