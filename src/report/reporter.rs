use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::report::sink::{ReportSink, RunReport};
use crate::report::types::{CaseRecord, Outcome, ReportSummary};

/// 收集 case 结果并在结束时输出到各个 sink
pub struct Reporter {
    run_id: Uuid,
    suite: String,
    started_at: DateTime<Utc>,
    records: Vec<CaseRecord>,
    sinks: Vec<Box<dyn ReportSink>>,
}

impl Reporter {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            suite: suite.into(),
            started_at: Utc::now(),
            records: Vec::new(),
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 记录一条结果
    pub fn record(
        &mut self,
        name: impl Into<String>,
        outcome: Outcome,
        duration_ms: u64,
        detail: Option<String>,
    ) {
        let record = CaseRecord {
            number: self.records.len() + 1,
            name: name.into(),
            outcome,
            duration_ms,
            detail,
            finished_at: Utc::now(),
        };

        for sink in &mut self.sinks {
            sink.on_record(&record);
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_records(&self.records)
    }

    /// 输出到所有 sink，sink 失败只记录警告
    pub fn finalize(&mut self) -> ReportSummary {
        let summary = self.summary();
        let run = RunReport {
            run_id: self.run_id,
            suite: &self.suite,
            started_at: self.started_at,
            finished_at: Utc::now(),
            summary: &summary,
            records: &self.records,
        };

        for sink in &mut self.sinks {
            if let Err(e) = sink.finalize(&run) {
                warn!(run_id = %self.run_id, "Failed to write report: {:#}", e);
            }
        }

        summary
    }
}
