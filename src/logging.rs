// ==========================================
// 日志初始化 (tracing-subscriber)
// ==========================================
// RUST_LOG 控制级别,默认 info
// RECIPE_COSTING_LOG_FORMAT=json 时输出 JSON 行
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FORMAT_ENV: &str = "RECIPE_COSTING_LOG_FORMAT";

const DEFAULT_DIRECTIVE: &str = "info";

/// 控制台输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// 解析格式取值; 未知取值回落到 Pretty
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// 安装全局 subscriber
///
/// ```no_run
/// recipe_costing::logging::init();
/// tracing::info!("ready");
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = fmt().with_env_filter(filter).with_line_number(true);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// 测试用: debug 级别写入测试输出,可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
