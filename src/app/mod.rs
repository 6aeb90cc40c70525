// ==========================================
// 配方成本管理系统 - 应用层
// ==========================================
// 职责: 装配共享状态,提供异步命令入口
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{map_api_error, with_timeout, ErrorResponse};
pub use state::{get_default_db_path, AppState, CatalogSummary};
