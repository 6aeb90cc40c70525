// ==========================================
// 配方成本管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储/引擎共享同一个连接（进程内串行化写事务）
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{MaterialApi, ProductApi, RecipeApi};
use crate::config::{CatalogConfigReader, ConfigManager};
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::engine::{
    MaterialRetirementGuard, PrimaryRecipeCoordinator, RecipeCostEngine, RecipeEditor,
    RecipeItemManager,
};
use crate::repository::{
    MaterialRepository, ProductRepository, RecipeRepository, RepositoryResult, SharedConnection,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "RECIPE_COSTING_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 材料API
    pub material_api: Arc<MaterialApi>,

    /// 产品API
    pub product_api: Arc<ProductApi>,

    /// 配方API（含配方项目、成本、主配方）
    pub recipe_api: Arc<RecipeApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    material_repo: Arc<MaterialRepository>,
    product_repo: Arc<ProductRepository>,
    recipe_repo: Arc<RecipeRepository>,
}

/// 目录概况（启动日志/健康检查）
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CatalogSummary {
    pub materials: i64,
    pub products: i64,
    pub recipes: i64,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并确保表结构存在
    /// 2. 初始化所有Repository与Engine
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        match read_schema_version(&conn) {
            Ok(Some(v)) if v > CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    schema_version = v,
                    expected = CURRENT_SCHEMA_VERSION,
                    "数据库 schema_version 高于当前程序版本"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取 schema_version 失败: {}", e),
        }

        Ok(Self::from_connection(db_path, Arc::new(Mutex::new(conn))))
    }

    /// 从已初始化的共享连接装配
    pub fn from_connection(db_path: String, conn: SharedConnection) -> Self {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let material_repo = Arc::new(MaterialRepository::new(conn.clone()));
        let product_repo = Arc::new(ProductRepository::new(conn.clone()));
        let recipe_repo = Arc::new(RecipeRepository::new(conn.clone()));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let catalog_config: Arc<dyn CatalogConfigReader> = config_manager.clone();

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let cost_engine = Arc::new(RecipeCostEngine::new(conn.clone()));
        let retirement_guard = Arc::new(MaterialRetirementGuard::new(conn.clone()));
        let primary_coordinator = Arc::new(PrimaryRecipeCoordinator::new(conn.clone()));
        let editor = Arc::new(RecipeEditor::new(conn.clone()));
        let item_manager = Arc::new(RecipeItemManager::new(conn));

        // ==========================================
        // 初始化API层
        // ==========================================
        let material_api = Arc::new(MaterialApi::new(
            material_repo.clone(),
            cost_engine.clone(),
            retirement_guard,
            catalog_config.clone(),
        ));
        let product_api = Arc::new(ProductApi::new(product_repo.clone(), catalog_config.clone()));
        let recipe_api = Arc::new(RecipeApi::new(
            recipe_repo.clone(),
            product_repo.clone(),
            editor,
            item_manager,
            cost_engine,
            primary_coordinator,
            catalog_config,
        ));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            material_api,
            product_api,
            recipe_api,
            config_manager,
            material_repo,
            product_repo,
            recipe_repo,
        }
    }

    /// 统计材料/产品/配方数量
    pub fn catalog_summary(&self) -> RepositoryResult<CatalogSummary> {
        Ok(CatalogSummary {
            materials: self.material_repo.count()?,
            products: self.product_repo.count()?,
            recipes: self.recipe_repo.count()?,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 RECIPE_COSTING_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./recipe_costing.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("recipe-costing-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("recipe-costing");

        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("recipe_costing.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_state_starts_empty() {
        let state = AppState::new(":memory:".to_string()).unwrap();
        let summary = state.catalog_summary().unwrap();
        assert_eq!(
            summary,
            CatalogSummary {
                materials: 0,
                products: 0,
                recipes: 0
            }
        );
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
