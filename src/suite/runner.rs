use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::Result;
use crate::report::{Outcome, Reporter};
use crate::suite::SuiteContext;

/// 单个步骤返回的 future
pub type StepFuture<'a> = BoxFuture<'a, Result<()>>;

/// setup / case / teardown 的执行体
///
/// 写法：`|ctx| Box::pin(async move { ... Ok(()) })`
pub type Step = Box<dyn for<'a> Fn(&'a mut SuiteContext) -> StepFuture<'a> + Send + Sync>;

/// suite 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    Init,
    SetupRunning,
    CaseRunning(usize),
    TeardownRunning,
    Done,
}

pub struct Case {
    group: Option<String>,
    name: String,
    step: Step,
}

impl Case {
    /// 报告中显示的名称，带分组前缀
    pub fn label(&self) -> String {
        match &self.group {
            Some(group) => format!("{} > {}", group, self.name),
            None => self.name.clone(),
        }
    }
}

/// describe 分组，只是名称前缀，不影响执行
pub struct Group {
    label: String,
    cases: Vec<Case>,
}

impl Group {
    pub fn it<F>(mut self, name: impl Into<String>, step: F) -> Self
    where
        F: for<'a> Fn(&'a mut SuiteContext) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.cases.push(Case {
            group: Some(self.label.clone()),
            name: name.into(),
            step: Box::new(step),
        });
        self
    }
}

/// 一组共享 setup / teardown 的 case
pub struct Suite {
    name: String,
    setup: Option<Step>,
    teardown: Option<Step>,
    cases: Vec<Case>,
}

/// 一次 suite 运行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteReport {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub setup_error: Option<String>,
    /// teardown 失败只作为警告
    pub teardown_warning: Option<String>,
    pub aborted: bool,
    /// 按顺序经过的状态
    pub states: Vec<SuiteState>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.setup_error.is_none() && !self.aborted
    }
}

/// 运行过程中的进度，abort 后用于补齐剩余 case 的记录
struct Progress {
    states: Vec<SuiteState>,
    setup_error: Option<String>,
    completed: usize,
    running: Option<usize>,
    passed: usize,
    failed: usize,
    skipped: usize,
}

impl Progress {
    fn new() -> Self {
        Self {
            states: vec![SuiteState::Init],
            setup_error: None,
            completed: 0,
            running: None,
            passed: 0,
            failed: 0,
            skipped: 0,
        }
    }

    fn enter(&mut self, suite: &str, state: SuiteState) {
        debug!(suite, ?state, "suite state");
        self.states.push(state);
    }

    fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Warning => {}
        }
    }
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            setup: None,
            teardown: None,
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.cases.iter()
    }

    /// 在所有 case 之前执行一次
    pub fn before_all<F>(mut self, step: F) -> Self
    where
        F: for<'a> Fn(&'a mut SuiteContext) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.setup = Some(Box::new(step));
        self
    }

    /// 在所有 case 之后执行一次，无论前面是否失败
    pub fn after_all<F>(mut self, step: F) -> Self
    where
        F: for<'a> Fn(&'a mut SuiteContext) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.teardown = Some(Box::new(step));
        self
    }

    pub fn it<F>(mut self, name: impl Into<String>, step: F) -> Self
    where
        F: for<'a> Fn(&'a mut SuiteContext) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.cases.push(Case {
            group: None,
            name: name.into(),
            step: Box::new(step),
        });
        self
    }

    pub fn describe(mut self, label: impl Into<String>, build: impl FnOnce(Group) -> Group) -> Self {
        let group = build(Group {
            label: label.into(),
            cases: Vec::new(),
        });
        self.cases.extend(group.cases);
        self
    }

    pub async fn run(&self, ctx: &mut SuiteContext, reporter: &mut Reporter) -> SuiteReport {
        self.run_until(ctx, reporter, std::future::pending::<()>())
            .await
    }

    /// Ctrl-C 时停止执行剩余 case，但仍然执行 teardown
    pub async fn run_until_interrupted(
        &self,
        ctx: &mut SuiteContext,
        reporter: &mut Reporter,
    ) -> SuiteReport {
        let interrupted = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // 无法监听信号时永不中断
                std::future::pending::<()>().await;
            }
            warn!("interrupt received, running teardown");
        };
        self.run_until(ctx, reporter, interrupted).await
    }

    /// `abort` 完成时停止 setup / case 阶段，剩余 case 记为跳过，然后执行 teardown
    pub async fn run_until<A>(
        &self,
        ctx: &mut SuiteContext,
        reporter: &mut Reporter,
        abort: A,
    ) -> SuiteReport
    where
        A: Future<Output = ()>,
    {
        info!(suite = %self.name, cases = self.cases.len(), "suite started");
        let mut progress = Progress::new();

        let aborted = {
            let body = self.run_body(ctx, reporter, &mut progress);
            tokio::select! {
                biased;
                _ = abort => true,
                _ = body => false,
            }
        };

        if aborted {
            warn!(suite = %self.name, completed = progress.completed, "suite aborted");
            for index in progress.completed..self.cases.len() {
                let case = &self.cases[index];
                let outcome = if progress.running == Some(index) {
                    Outcome::Failed
                } else {
                    Outcome::Skipped
                };
                let detail = match outcome {
                    Outcome::Failed => "aborted while running",
                    _ => "aborted",
                };
                reporter.record(case.label(), outcome, 0, Some(detail.to_string()));
                progress.tally(outcome);
            }
        }

        progress.enter(&self.name, SuiteState::TeardownRunning);
        let teardown_warning = match &self.teardown {
            Some(teardown) => {
                let started = Instant::now();
                match run_step(teardown, ctx).await {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(suite = %self.name, "teardown failed: {}", e);
                        reporter.record(
                            format!("{} > after all", self.name),
                            Outcome::Warning,
                            elapsed_ms(started),
                            Some(e.clone()),
                        );
                        Some(e)
                    }
                }
            }
            None => None,
        };
        progress.enter(&self.name, SuiteState::Done);

        let report = SuiteReport {
            name: self.name.clone(),
            passed: progress.passed,
            failed: progress.failed,
            skipped: progress.skipped,
            setup_error: progress.setup_error,
            teardown_warning,
            aborted,
            states: progress.states,
        };
        info!(
            suite = %self.name,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "suite finished"
        );
        report
    }

    async fn run_body(&self, ctx: &mut SuiteContext, reporter: &mut Reporter, progress: &mut Progress) {
        if let Some(setup) = &self.setup {
            progress.enter(&self.name, SuiteState::SetupRunning);
            let started = Instant::now();
            if let Err(e) = run_step(setup, ctx).await {
                warn!(suite = %self.name, "setup failed: {}", e);
                reporter.record(
                    format!("{} > before all", self.name),
                    Outcome::Failed,
                    elapsed_ms(started),
                    Some(e.clone()),
                );
                progress.setup_error = Some(e);
            }
        }

        for (index, case) in self.cases.iter().enumerate() {
            progress.enter(&self.name, SuiteState::CaseRunning(index));
            progress.running = Some(index);

            let (outcome, duration_ms, detail) = match &progress.setup_error {
                // setup 失败时不在未定义的状态上执行 case
                Some(err) => (Outcome::Skipped, 0, Some(format!("setup failed: {}", err))),
                None => {
                    let started = Instant::now();
                    match run_step(&case.step, ctx).await {
                        Ok(()) => (Outcome::Passed, elapsed_ms(started), None),
                        Err(e) => {
                            warn!(case = %case.label(), "case failed: {}", e);
                            (Outcome::Failed, elapsed_ms(started), Some(e))
                        }
                    }
                }
            };

            reporter.record(case.label(), outcome, duration_ms, detail);
            progress.tally(outcome);
            progress.running = None;
            progress.completed = index + 1;
        }
    }
}

/// 执行一个步骤，错误与 panic 都转换成文字描述
async fn run_step(step: &Step, ctx: &mut SuiteContext) -> std::result::Result<(), String> {
    match AssertUnwindSafe(async { step(ctx).await }).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
