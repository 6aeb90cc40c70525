// ==========================================
// 配方成本管理系统 - 主配方协调器
// ==========================================
// 红线: 同一产品至多一个主配方
// 顺序: 先撤销同产品其他主配方,再提升目标（同一事务; 部分唯一索引兜底）
// ==========================================

use crate::domain::recipe::Recipe;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tx::{with_immediate_tx, SharedConnection};
use crate::repository::RecipeRepository;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, instrument};

/// 把 recipe 设为所属产品的唯一主配方（事务内）
///
/// # 返回
/// - 被撤销主配方标记的兄弟配方数
pub fn promote_tx(conn: &Connection, recipe: &Recipe, now: DateTime<Utc>) -> RepositoryResult<usize> {
    let demoted = RecipeRepository::demote_siblings_tx(conn, recipe.product_id, recipe.id, now)?;
    RecipeRepository::set_primary_flag_tx(conn, recipe.id, true, now)?;
    Ok(demoted)
}

// ==========================================
// PrimaryRecipeCoordinator - 主配方协调器
// ==========================================
pub struct PrimaryRecipeCoordinator {
    conn: SharedConnection,
}

impl PrimaryRecipeCoordinator {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 设为主配方（幂等）
    ///
    /// # 返回
    /// - 更新后的配方
    /// - Err(NotFound): 配方不存在
    #[instrument(skip(self))]
    pub fn set_primary(&self, recipe_id: i64) -> RepositoryResult<Recipe> {
        let now = Utc::now();
        let (recipe, demoted) = with_immediate_tx(&self.conn, |tx| {
            let recipe = RecipeRepository::find_by_id_tx(tx, recipe_id)?
                .ok_or_else(|| RepositoryError::not_found("Recipe", recipe_id))?;

            let demoted = promote_tx(tx, &recipe, now)?;

            let refreshed = RecipeRepository::find_by_id_tx(tx, recipe_id)?
                .ok_or_else(|| RepositoryError::not_found("Recipe", recipe_id))?;
            Ok((refreshed, demoted))
        })?;

        info!(recipe_id, product_id = recipe.product_id, demoted, "已设为主配方");
        Ok(recipe)
    }
}
