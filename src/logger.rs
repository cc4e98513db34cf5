use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: info
///
/// 示例:
/// - RUST_LOG=debug cargo test -- --nocapture
/// - RUST_LOG=mercado_contract=trace cargo test
///
/// 可以重复调用，已经初始化过时直接返回（测试里每个用例都会调用）
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let initialized = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_test_writer()
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Logger initialized");
    }
}
