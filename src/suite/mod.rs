pub mod context;
pub mod runner;

pub use context::SuiteContext;
pub use runner::{Case, Group, Step, StepFuture, Suite, SuiteReport, SuiteState};
