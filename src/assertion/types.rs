use std::fmt;

use serde_json::Value;

/// 断言错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssertError {
    #[error("Invalid assertion syntax: {0}")]
    InvalidSyntax(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Value extraction failed: {0}")]
    ExtractionError(String),

    #[error("Response body is not JSON")]
    BodyNotJson,

    #[error("Expected status {expected}, but got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    #[error("Expected header {name} to be \"{expected}\", but got {}", show_header(.actual))]
    HeaderMismatch {
        name: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("JSON {mode} mismatch: {}", format_mismatches(.mismatches))]
    JsonMismatch {
        mode: MatchMode,
        mismatches: Vec<JsonMismatch>,
    },

    #[error("{0}")]
    Failed(String),
}

fn show_header(actual: &Option<String>) -> String {
    match actual {
        Some(value) => format!("\"{}\"", value),
        None => "nothing".to_string(),
    }
}

fn format_mismatches(mismatches: &[JsonMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// JSON 比较模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// 完全相等
    Exact,
    /// 期望值中的字段必须存在且相等，实际值多出的字段忽略；数组必须逐个元素、按顺序完全相等
    Subset,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "equality"),
            MatchMode::Subset => write!(f, "subset"),
        }
    }
}

/// 单个路径上的差异
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMismatch {
    /// `$.errors[1].value`
    pub path: String,
    /// None 表示该位置不应存在
    pub expected: Option<Value>,
    /// None 表示该位置缺失
    pub actual: Option<Value>,
}

impl fmt::Display for JsonMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<Value>| match v {
            Some(v) => v.to_string(),
            None => "<missing>".to_string(),
        };
        write!(
            f,
            "{}: expected {}, got {}",
            self.path,
            show(&self.expected),
            show(&self.actual)
        )
    }
}

/// 断言表达式
#[derive(Debug, Clone, PartialEq)]
pub enum AssertExpr {
    /// 比较断言: left op right
    Compare {
        left: ValuePath,
        op: CompareOp,
        right: AssertValue,
    },
    /// 存在性断言: path exists
    Exists { path: ValuePath },
}

impl fmt::Display for AssertExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertExpr::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            AssertExpr::Exists { path } => write!(f, "{} exists", path),
        }
    }
}

/// JSON 路径段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// 值路径 - 用于从响应中提取值
#[derive(Debug, Clone, PartialEq)]
pub enum ValuePath {
    /// HTTP 状态码
    Status,
    /// 响应 Header
    Header(String),
    /// JSON Body 路径，空列表表示整个 body
    Body(Vec<PathSegment>),
    /// 响应时间（毫秒）
    ResponseTime,
}

impl ValuePath {
    pub fn parse(input: &str) -> Result<Self, AssertError> {
        crate::assertion::parser::parse_value_path(input)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePath::Status => write!(f, "status"),
            ValuePath::Header(name) => write!(f, "headers.{}", name),
            ValuePath::Body(segments) => {
                write!(f, "body")?;
                for segment in segments {
                    match segment {
                        PathSegment::Key(key) => write!(f, ".{}", key)?,
                        PathSegment::Index(index) => write!(f, "[{}]", index)?,
                    }
                }
                Ok(())
            }
            ValuePath::ResponseTime => write!(f, "response.time"),
        }
    }
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,          // ==
    NotEqual,       // !=
    Greater,        // >
    Less,           // <
    GreaterOrEqual, // >=
    LessOrEqual,    // <=
    Contains,       // contains
}

impl CompareOp {
    /// 按匹配优先级排列，多字符运算符在前
    pub const ALL: [&'static str; 7] = [">=", "<=", "==", "!=", ">", "<", "contains"];

    /// 从字符串解析运算符
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            ">" => Some(Self::Greater),
            "<" => Some(Self::Less),
            ">=" => Some(Self::GreaterOrEqual),
            "<=" => Some(Self::LessOrEqual),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Contains => "contains",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 断言值
#[derive(Debug, Clone, PartialEq)]
pub enum AssertValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

impl fmt::Display for AssertValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertValue::Number(n) => write!(f, "{}", n),
            AssertValue::String(s) => write!(f, "\"{}\"", s),
            AssertValue::Bool(b) => write!(f, "{}", b),
            AssertValue::Null => write!(f, "null"),
        }
    }
}

impl AssertValue {
    /// 比较两个值
    pub fn compare(&self, op: CompareOp, other: &AssertValue) -> Result<bool, AssertError> {
        match (self, other) {
            // 数字比较
            (AssertValue::Number(a), AssertValue::Number(b)) => Ok(match op {
                CompareOp::Equal => (a - b).abs() < f64::EPSILON,
                CompareOp::NotEqual => (a - b).abs() >= f64::EPSILON,
                CompareOp::Greater => a > b,
                CompareOp::Less => a < b,
                CompareOp::GreaterOrEqual => a >= b,
                CompareOp::LessOrEqual => a <= b,
                CompareOp::Contains => {
                    return Err(AssertError::TypeMismatch {
                        expected: "string".to_string(),
                        actual: "number".to_string(),
                    });
                }
            }),

            // 字符串比较
            (AssertValue::String(a), AssertValue::String(b)) => Ok(match op {
                CompareOp::Equal => a == b,
                CompareOp::NotEqual => a != b,
                CompareOp::Contains => a.contains(b.as_str()),
                _ => {
                    return Err(AssertError::TypeMismatch {
                        expected: "number".to_string(),
                        actual: "string".to_string(),
                    });
                }
            }),

            // 布尔比较
            (AssertValue::Bool(a), AssertValue::Bool(b)) => Ok(match op {
                CompareOp::Equal => a == b,
                CompareOp::NotEqual => a != b,
                _ => {
                    return Err(AssertError::InvalidOperator(format!(
                        "Operator {} not supported for boolean values",
                        op
                    )));
                }
            }),

            // Null 与任意类型
            (AssertValue::Null, _) | (_, AssertValue::Null) => Ok(match op {
                CompareOp::Equal => self == other,
                CompareOp::NotEqual => self != other,
                _ => {
                    return Err(AssertError::InvalidOperator(format!(
                        "Operator {} not supported for null comparison",
                        op
                    )));
                }
            }),

            // 类型不匹配
            _ => Err(AssertError::TypeMismatch {
                expected: format!("{:?}", other),
                actual: format!("{:?}", self),
            }),
        }
    }
}

/// 对响应的一条期望
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// 状态码完全相等
    Status(u16),
    /// body 与给定 JSON 完全相等
    Json(Value),
    /// body 包含给定 JSON（见 [`MatchMode::Subset`]）
    JsonLike(Value),
    /// header 相等，名称大小写不敏感
    Header { name: String, value: String },
    /// 文本断言，例如 `body[0].id exists`
    Expr(AssertExpr),
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Status(code) => write!(f, "status == {}", code),
            Expectation::Json(value) => write!(f, "body == {}", value),
            Expectation::JsonLike(value) => write!(f, "body like {}", value),
            Expectation::Header { name, value } => write!(f, "headers.{} == \"{}\"", name, value),
            Expectation::Expr(expr) => write!(f, "{}", expr),
        }
    }
}
