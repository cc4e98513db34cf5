pub mod reporter;
pub mod sink;
pub mod types;

pub use reporter::Reporter;
pub use sink::{ConsoleSink, JsonFileSink, ReportSink, RunReport};
pub use types::{CaseRecord, Outcome, ReportSummary};
