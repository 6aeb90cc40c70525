// ==========================================
// 配方成本管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 材料 → 配方 → 产品 的成本核算
// ==========================================

pub mod api; // 校验 + 业务接口
pub mod app; // 状态装配与异步命令
pub mod config;
pub mod db; // 连接、PRAGMA、建表
pub mod domain;
pub mod engine; // 成本计算与跨实体规则
pub mod logging;
pub mod repository;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MaterialCategory, ProductCategory, RecipeItemType, RecipeStatus};

// 领域实体
pub use domain::{
    FieldPatch, Material, MaterialUpdate, NewMaterial, NewProduct, NewRecipe, NewRecipeItem,
    Product, ProductUpdate, Recipe, RecipeItem, RecipeItemUpdate, RecipeUpdate,
};

// 引擎
pub use engine::{
    MaterialRetirementGuard, PrimaryRecipeCoordinator, RecipeCostEngine, RecipeEditor,
    RecipeItemManager,
};

// API
pub use api::{ApiError, ApiResult, MaterialApi, ProductApi, RecipeApi};

// 应用
pub use app::{get_default_db_path, AppState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "配方成本管理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
