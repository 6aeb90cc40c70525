// ==========================================
// 配方成本管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、请求对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod material;
pub mod patch;
pub mod product;
pub mod query;
pub mod recipe;
pub mod types;

// 重导出核心类型
pub use material::{Material, MaterialDetail, MaterialUpdate, MaterialUsage, NewMaterial};
pub use patch::FieldPatch;
pub use product::{NewProduct, Product, ProductDetail, ProductUpdate};
pub use query::{ListQuery, PageRequest, RecipeQuery};
pub use recipe::{
    NewRecipe, NewRecipeItem, Recipe, RecipeDetail, RecipeItem, RecipeItemUpdate,
    RecipeItemView, RecipeUpdate,
};
pub use types::{MaterialCategory, ProductCategory, RecipeItemType, RecipeStatus};
