// ==========================================
// 配方成本管理系统 - 主入口
// ==========================================
// 职责: 初始化日志、打开数据库、确保表结构、输出目录概况
// ==========================================

use anyhow::Context;
use recipe_costing::app::{get_default_db_path, AppState};
use recipe_costing::logging;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", recipe_costing::APP_NAME);
    tracing::info!("系统版本: {}", recipe_costing::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径（命令行参数优先）
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    let summary = app_state
        .catalog_summary()
        .context("统计目录失败")?;
    tracing::info!(
        materials = summary.materials,
        products = summary.products,
        recipes = summary.recipes,
        "目录概况"
    );

    match app_state.config_manager.get_config_snapshot() {
        Ok(snapshot) => tracing::debug!(snapshot = %snapshot, "配置快照"),
        Err(e) => tracing::warn!("读取配置快照失败: {}", e),
    }

    Ok(())
}
