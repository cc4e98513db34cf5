use serde_json::Value;

use crate::assertion::types::{JsonMismatch, MatchMode};

/// 比较两个 JSON 值，返回所有不一致的路径（按出现顺序）
///
/// `Subset` 模式下对象只检查期望值中出现的 key；数组始终要求长度、顺序和元素完全一致
pub fn json_diff(expected: &Value, actual: &Value, mode: MatchMode) -> Vec<JsonMismatch> {
    let mut mismatches = Vec::new();
    diff_at("$", expected, actual, mode, &mut mismatches);
    mismatches
}

fn diff_at(
    path: &str,
    expected: &Value,
    actual: &Value,
    mode: MatchMode,
    out: &mut Vec<JsonMismatch>,
) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_value) in exp {
                let child = format!("{}.{}", path, key);
                match act.get(key) {
                    Some(act_value) => diff_at(&child, exp_value, act_value, mode, out),
                    None => out.push(JsonMismatch {
                        path: child,
                        expected: Some(exp_value.clone()),
                        actual: None,
                    }),
                }
            }
            if mode == MatchMode::Exact {
                for (key, act_value) in act {
                    if !exp.contains_key(key) {
                        out.push(JsonMismatch {
                            path: format!("{}.{}", path, key),
                            expected: None,
                            actual: Some(act_value.clone()),
                        });
                    }
                }
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            // 数组内部一律按完全相等比较
            let len = exp.len().max(act.len());
            for index in 0..len {
                let child = format!("{}[{}]", path, index);
                match (exp.get(index), act.get(index)) {
                    (Some(e), Some(a)) => diff_at(&child, e, a, MatchMode::Exact, out),
                    (e, a) => out.push(JsonMismatch {
                        path: child,
                        expected: e.cloned(),
                        actual: a.cloned(),
                    }),
                }
            }
        }
        (Value::Number(e), Value::Number(a)) => {
            if !numbers_equal(e, a) {
                out.push(mismatch(path, expected, actual));
            }
        }
        _ => {
            if expected != actual {
                out.push(mismatch(path, expected, actual));
            }
        }
    }
}

/// 两边都是整数时精确比较；含浮点数时按数值比较，`1` 与 `1.0` 视为相等
fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn as_integer(n: &serde_json::Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn mismatch(path: &str, expected: &Value, actual: &Value) -> JsonMismatch {
    JsonMismatch {
        path: path.to_string(),
        expected: Some(expected.clone()),
        actual: Some(actual.clone()),
    }
}
