/// 断言模块 - 提供 API 响应断言能力
mod diff;
mod evaluator;
mod extractor;
mod parser;
mod types;

pub use diff::json_diff;
pub use evaluator::check;
pub use extractor::{extract_json, extract_value};
pub use parser::{parse_assertion, parse_value_path};
pub use types::{
    AssertError, AssertExpr, AssertValue, CompareOp, Expectation, JsonMismatch,
    MatchMode, PathSegment, ValuePath,
};
