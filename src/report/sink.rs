use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;
use uuid::Uuid;

use crate::report::types::{CaseRecord, Outcome, ReportSummary};

/// 报告输出目标
///
/// 只做观察，不影响 case 结果；出错时由 Reporter 记录警告
pub trait ReportSink: Send {
    /// 每记录一条结果时调用
    fn on_record(&mut self, _record: &CaseRecord) {}

    /// 运行结束时调用一次
    fn finalize(&mut self, run: &RunReport<'_>) -> Result<()>;
}

/// 传给 sink 的完整运行结果
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub suite: &'a str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: &'a ReportSummary,
    pub records: &'a [CaseRecord],
}

/// 彩色终端输出
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ReportSink for ConsoleSink {
    fn on_record(&mut self, record: &CaseRecord) {
        let symbol = match record.outcome {
            Outcome::Passed => "✓".green(),
            Outcome::Failed => "✗".red(),
            Outcome::Skipped => "⊘".dimmed(),
            Outcome::Warning => "!".yellow(),
        };

        println!(
            " {} [{}] {} ({}ms)",
            symbol, record.number, record.name, record.duration_ms
        );

        // 失败时总是显示原因，其他情况只在 verbose 下显示
        if let Some(detail) = &record.detail
            && (self.verbose || record.outcome != Outcome::Passed)
        {
            let label = match record.outcome {
                Outcome::Failed => "Error".red().bold(),
                Outcome::Warning => "Warning".yellow().bold(),
                _ => "Note".dimmed(),
            };
            println!("   {}: {}", label, detail);
        }
    }

    fn finalize(&mut self, run: &RunReport<'_>) -> Result<()> {
        let summary = run.summary;

        let mut table = Table::new();
        table.set_header(vec!["Suite", "Passed", "Failed", "Skipped", "Warnings", "Total", "Duration"]);
        table.add_row(vec![
            Cell::new(run.suite),
            Cell::new(summary.passed).fg(Color::Green),
            Cell::new(summary.failed).fg(if summary.failed > 0 {
                Color::Red
            } else {
                Color::Reset
            }),
            Cell::new(summary.skipped),
            Cell::new(summary.warnings).fg(if summary.warnings > 0 {
                Color::Yellow
            } else {
                Color::Reset
            }),
            Cell::new(summary.total),
            Cell::new(format!("{:.3}s", summary.duration_ms as f64 / 1000.0)),
        ]);

        println!("\n{}", "Summary".bold());
        println!("{table}");
        println!();
        Ok(())
    }
}

/// 将完整报告写成 JSON 文件
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonFileSink {
    fn finalize(&mut self, run: &RunReport<'_>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(run)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write report to {}", self.path.display()))?;
        Ok(())
    }
}
