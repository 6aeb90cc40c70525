// ==========================================
// 配方成本管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约定: `xxx(&self)` 自行加锁; `xxx_tx(&Connection)` 在调用方事务内执行
// ==========================================

pub mod error;
pub mod filter_sql;
pub mod material_repo;
pub mod product_repo;
pub mod recipe_item_repo;
pub mod recipe_repo;
pub mod row_codec;
pub mod tx;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use material_repo::MaterialRepository;
pub use product_repo::ProductRepository;
pub use recipe_item_repo::RecipeItemRepository;
pub use recipe_repo::RecipeRepository;
pub use tx::{lock_conn, with_conn, with_immediate_tx, with_read_tx, SharedConnection};
