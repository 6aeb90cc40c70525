// ==========================================
// 配方成本管理系统 - 配方项目管理器
// ==========================================
// 职责: 项目增/改/删 + 同一事务内重算项目成本与配方成本
// 红线: 同一配方不可重复引用同一材料
// ==========================================

use crate::domain::recipe::{NewRecipeItem, RecipeItem, RecipeItemUpdate, RecipeItemView};
use crate::engine::cost_calculator::item_cost;
use crate::engine::recipe_cost::recompute_recipe_tx;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tx::{with_conn, with_immediate_tx, SharedConnection};
use crate::repository::{MaterialRepository, RecipeItemRepository, RecipeRepository};
use chrono::Utc;
use tracing::{debug, info, instrument};

// ==========================================
// RecipeItemManager - 配方项目管理器
// ==========================================
pub struct RecipeItemManager {
    conn: SharedConnection,
}

impl RecipeItemManager {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 向配方添加项目
    ///
    /// # 返回
    /// - Ok(RecipeItem): 新项目（含计算后的成本）
    /// - Err(NotFound): 配方或材料不存在
    /// - Err(BusinessRuleViolation): 该材料已在配方中
    /// - Err(CostOverflow): 项目或配方成本越界
    #[instrument(skip(self, new), fields(material_id = new.material_id))]
    pub fn add_item(&self, recipe_id: i64, new: NewRecipeItem) -> RepositoryResult<RecipeItem> {
        let now = Utc::now();
        let (item, total) = with_immediate_tx(&self.conn, |tx| {
            if RecipeRepository::find_by_id_tx(tx, recipe_id)?.is_none() {
                return Err(RepositoryError::not_found("Recipe", recipe_id));
            }
            let material = MaterialRepository::find_by_id_tx(tx, new.material_id)?
                .ok_or_else(|| RepositoryError::not_found("Material", new.material_id))?;

            if RecipeItemRepository::exists_for_material_tx(tx, recipe_id, new.material_id)? {
                return Err(RepositoryError::BusinessRuleViolation(format!(
                    "材料 {}(id={}) 已在配方(id={})中",
                    material.name, material.id, recipe_id
                )));
            }

            let cost = item_cost(new.quantity, new.conversion_ratio, material.cost_per_unit)?;
            let item = RecipeItemRepository::insert_tx(tx, recipe_id, &new, cost, now)?;
            let total = recompute_recipe_tx(tx, recipe_id, now)?;
            Ok((item, total))
        })?;

        info!(recipe_id, item_id = item.id, cost = %item.estimated_cost, total = %total, "配方项目已添加");
        Ok(item)
    }

    /// 更新配方项目
    ///
    /// 项目成本按（可能已更新的）用量/比例与材料当前单位成本重算
    #[instrument(skip(self, update))]
    pub fn update_item(&self, item_id: i64, update: RecipeItemUpdate) -> RepositoryResult<RecipeItem> {
        let now = Utc::now();
        let (item, total) = with_immediate_tx(&self.conn, |tx| {
            let mut item = RecipeItemRepository::find_by_id_tx(tx, item_id)?
                .ok_or_else(|| RepositoryError::not_found("RecipeItem", item_id))?;
            let material = MaterialRepository::find_by_id_tx(tx, item.material_id)?
                .ok_or_else(|| RepositoryError::not_found("Material", item.material_id))?;

            item.apply_update(update, now);
            item.estimated_cost =
                item_cost(item.quantity, item.conversion_ratio, material.cost_per_unit)?;
            RecipeItemRepository::update_tx(tx, &item)?;

            let total = recompute_recipe_tx(tx, item.recipe_id, now)?;
            Ok((item, total))
        })?;

        info!(item_id, recipe_id = item.recipe_id, cost = %item.estimated_cost, total = %total, "配方项目已更新");
        Ok(item)
    }

    /// 删除配方项目并重算原配方
    ///
    /// # 返回
    /// - 原配方 id
    #[instrument(skip(self))]
    pub fn remove_item(&self, item_id: i64) -> RepositoryResult<i64> {
        let now = Utc::now();
        let (recipe_id, total) = with_immediate_tx(&self.conn, |tx| {
            let item = RecipeItemRepository::find_by_id_tx(tx, item_id)?
                .ok_or_else(|| RepositoryError::not_found("RecipeItem", item_id))?;
            RecipeItemRepository::delete_tx(tx, item_id)?;
            let total = recompute_recipe_tx(tx, item.recipe_id, now)?;
            Ok((item.recipe_id, total))
        })?;

        info!(item_id, recipe_id, total = %total, "配方项目已删除");
        Ok(recipe_id)
    }

    /// 查询单个项目（含材料名称/单位）
    pub fn get_item(&self, item_id: i64) -> RepositoryResult<RecipeItemView> {
        let view = with_conn(&self.conn, |conn| RecipeItemRepository::find_view_tx(conn, item_id))?
            .ok_or_else(|| RepositoryError::not_found("RecipeItem", item_id))?;
        debug!(item_id, "查询配方项目");
        Ok(view)
    }

    /// 配方项目列表（sort_order、材料名排序）
    pub fn list_items(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeItemView>> {
        with_conn(&self.conn, |conn| {
            if RecipeRepository::find_by_id_tx(conn, recipe_id)?.is_none() {
                return Err(RepositoryError::not_found("Recipe", recipe_id));
            }
            RecipeItemRepository::list_views_by_recipe_tx(conn, recipe_id)
        })
    }
}
