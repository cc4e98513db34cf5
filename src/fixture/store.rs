use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::{HarnessError, Result};

/// 一次 suite 运行期间共享的 fixture
///
/// 每个 key 只能写入一次（通常在 setup 阶段），之后的 case 与 teardown 只读
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    values: HashMap<String, Value>,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入 fixture，同一个 key 第二次写入返回 FixtureAlreadySet
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(HarnessError::FixtureAlreadySet(key));
        }
        let value = value.into();
        debug!(fixture = %key, value = %value, "fixture captured");
        self.values.insert(key, value);
        Ok(())
    }

    /// 一次写入多个 fixture：任何一个 key 已存在或重复时都不写入
    pub fn set_all(&mut self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut seen = HashSet::new();
        for (key, _) in &entries {
            if self.values.contains_key(key) || !seen.insert(key.as_str()) {
                return Err(HarnessError::FixtureAlreadySet(key.clone()));
            }
        }
        for (key, value) in entries {
            debug!(fixture = %key, value = %value, "fixture captured");
            self.values.insert(key, value);
        }
        Ok(())
    }

    /// 读取 fixture，未写入时返回 UninitializedFixture
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| HarnessError::UninitializedFixture(key.to_string()))
    }

    /// 以路径片段的形式读取：字符串不带引号，数字原样输出
    pub fn get_str(&self, key: &str) -> Result<String> {
        Ok(match self.get(key)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// fixture 数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
