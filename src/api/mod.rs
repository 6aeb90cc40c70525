// ==========================================
// 配方成本管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口（校验 + 错误映射）,供命令层调用
// ==========================================

pub mod error;
pub mod material_api;
pub mod paging;
pub mod product_api;
pub mod recipe_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult, FieldViolation};
pub use material_api::MaterialApi;
pub use product_api::ProductApi;
pub use recipe_api::RecipeApi;
