pub mod model;
pub mod suite;

pub use model::{
    CNPJ_14_DIGITOS, CNPJ_LEN, FieldError, INVALID_CNPJ, Mercado, NOME_OBRIGATORIO, SUB_RESOURCES,
    VALID_CNPJ, invalid_cnpj_errors,
};
pub use suite::{ITEM_ID, MISSING_ID, mercado_suite};

use crate::Result;
use crate::config::Settings;
use crate::report::{ConsoleSink, JsonFileSink, Reporter};
use crate::suite::{SuiteContext, SuiteReport};

/// 按给定设置运行 mercado suite
///
/// 结果输出到终端；设置了 `report_path` 时同时写 JSON 报告。
/// Ctrl-C 会中止剩余 case，但 teardown 仍会执行。
pub async fn run(settings: &Settings) -> Result<SuiteReport> {
    let mut ctx = SuiteContext::from_settings(settings)?;
    let suite = mercado_suite();

    let mut reporter = Reporter::new(suite.name()).with_sink(ConsoleSink::default());
    if let Some(path) = &settings.report_path {
        reporter = reporter.with_sink(JsonFileSink::new(path.clone()));
    }

    let report = suite.run_until_interrupted(&mut ctx, &mut reporter).await;
    reporter.finalize();
    Ok(report)
}
