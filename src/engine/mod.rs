// ==========================================
// 配方成本管理系统 - 引擎层
// ==========================================
// 职责: 业务规则与事务编排（成本重算、主配方互斥、材料退役）
// 红线: 引擎不拼写 SQL,数据访问一律经由 Repository
// ==========================================

pub mod cost_calculator;
pub mod material_retirement;
pub mod primary_recipe;
pub mod recipe_cost;
pub mod recipe_editor;
pub mod recipe_items;

// 重导出核心引擎
pub use cost_calculator::{item_cost, recipe_cost, round_money, round_quantity};
pub use material_retirement::{MaterialRetirementGuard, RetirementOutcome};
pub use primary_recipe::PrimaryRecipeCoordinator;
pub use recipe_cost::RecipeCostEngine;
pub use recipe_editor::RecipeEditor;
pub use recipe_items::RecipeItemManager;
