use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 单个 case 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    /// teardown 失败，不影响整体结果
    Warning,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
            Outcome::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// 一条报告记录
#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    /// 记录序号（从 1 开始）
    pub number: usize,

    pub name: String,

    pub outcome: Outcome,

    pub duration_ms: u64,

    /// 失败原因或跳过原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    pub finished_at: DateTime<Utc>,
}

/// 测试摘要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub duration_ms: u64,
}

impl ReportSummary {
    pub fn from_records(records: &[CaseRecord]) -> Self {
        let count = |outcome: Outcome| records.iter().filter(|r| r.outcome == outcome).count();

        Self {
            total: records.len(),
            passed: count(Outcome::Passed),
            failed: count(Outcome::Failed),
            skipped: count(Outcome::Skipped),
            warnings: count(Outcome::Warning),
            duration_ms: records.iter().map(|r| r.duration_ms).sum(),
        }
    }
}
