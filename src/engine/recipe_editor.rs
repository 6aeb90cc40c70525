// ==========================================
// 配方成本管理系统 - 配方编辑器
// ==========================================
// 职责: 配方创建 / 部分更新
// - 创建: 产品必须存在; 初始为草稿、非主配方、成本 0
// - 更新: is_primary=true 先撤销同产品其他主配方; 同一事务内重算成本
// - 详情: 配方、产品抬头与项目在同一读事务内读取
// ==========================================

use crate::domain::recipe::{NewRecipe, Recipe, RecipeDetail, RecipeUpdate};
use crate::engine::primary_recipe::promote_tx;
use crate::engine::recipe_cost::recompute_recipe_tx;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tx::{with_immediate_tx, with_read_tx, SharedConnection};
use crate::repository::{ProductRepository, RecipeItemRepository, RecipeRepository};
use chrono::Utc;
use tracing::{info, instrument};

pub struct RecipeEditor {
    conn: SharedConnection,
}

impl RecipeEditor {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 创建配方
    ///
    /// # 返回
    /// - Err(NotFound): 产品不存在
    /// - Err(UniqueConstraintViolation): (产品, 名称, 版本) 重复
    #[instrument(skip(self, new), fields(product_id = new.product_id, name = %new.name, version = %new.version))]
    pub fn create(&self, new: NewRecipe) -> RepositoryResult<Recipe> {
        let now = Utc::now();
        let recipe = with_immediate_tx(&self.conn, |tx| {
            if !ProductRepository::exists_tx(tx, new.product_id)? {
                return Err(RepositoryError::not_found("Product", new.product_id));
            }
            RecipeRepository::insert_tx(tx, &new, now)
        })?;

        info!(recipe_id = recipe.id, "配方已创建");
        Ok(recipe)
    }

    /// 部分更新配方
    ///
    /// # 返回
    /// - Ok(None): 配方不存在
    #[instrument(skip(self, update))]
    pub fn update(&self, recipe_id: i64, update: RecipeUpdate) -> RepositoryResult<Option<Recipe>> {
        let now = Utc::now();
        let primary_request = update.is_primary;

        let updated = with_immediate_tx(&self.conn, |tx| {
            let mut recipe = match RecipeRepository::find_by_id_tx(tx, recipe_id)? {
                Some(r) => r,
                None => return Ok(None),
            };

            match primary_request {
                Some(true) => {
                    promote_tx(tx, &recipe, now)?;
                }
                Some(false) => {
                    RecipeRepository::set_primary_flag_tx(tx, recipe_id, false, now)?;
                }
                None => {}
            }

            recipe.apply_update(update, now);
            RecipeRepository::update_fields_tx(tx, &recipe)?;
            recompute_recipe_tx(tx, recipe_id, now)?;

            RecipeRepository::find_by_id_tx(tx, recipe_id)
        })?;

        if let Some(recipe) = &updated {
            info!(recipe_id, is_primary = recipe.is_primary, status = %recipe.status, "配方已更新");
        }
        Ok(updated)
    }

    /// 配方详情
    ///
    /// # 返回
    /// - Err(NotFound): 配方不存在
    pub fn detail(&self, recipe_id: i64) -> RepositoryResult<RecipeDetail> {
        with_read_tx(&self.conn, |conn| {
            let recipe = RecipeRepository::find_by_id_tx(conn, recipe_id)?
                .ok_or_else(|| RepositoryError::not_found("Recipe", recipe_id))?;
            let (product_name, product_code) =
                RecipeRepository::find_product_header_tx(conn, recipe_id)?
                    .ok_or_else(|| RepositoryError::not_found("Recipe", recipe_id))?;
            let items = RecipeItemRepository::list_views_by_recipe_tx(conn, recipe_id)?;
            Ok(RecipeDetail {
                recipe,
                product_name,
                product_code,
                items,
            })
        })
    }
}
