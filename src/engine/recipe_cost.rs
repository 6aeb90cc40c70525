// ==========================================
// 配方成本管理系统 - 配方成本引擎
// ==========================================
// 职责: 成本重算并落库
// 红线: 重算在调用方写事务内新鲜读取项目,不使用事务外快照
// 触发: 项目增/改/删、材料单位成本变化、显式重算
// ==========================================

use crate::domain::material::{Material, MaterialUpdate};
use crate::engine::cost_calculator::{item_cost, recipe_cost};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tx::{with_conn, with_immediate_tx, SharedConnection};
use crate::repository::{MaterialRepository, RecipeItemRepository, RecipeRepository};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// 重算配方总成本并写回（事务内）
///
/// # 返回
/// - 新的配方总成本
pub fn recompute_recipe_tx(
    conn: &Connection,
    recipe_id: i64,
    now: DateTime<Utc>,
) -> RepositoryResult<Decimal> {
    let items = RecipeItemRepository::list_by_recipe_tx(conn, recipe_id)?;
    let total = recipe_cost(&items)?;
    RecipeRepository::update_estimated_cost_tx(conn, recipe_id, total, now)?;
    debug!(recipe_id, items = items.len(), total = %total, "配方成本已重算");
    Ok(total)
}

/// 按材料当前单位成本重新计价引用它的全部项目,并重算受影响配方（事务内）
///
/// # 返回
/// - 受影响的配方数
pub fn reprice_material_tx(
    conn: &Connection,
    material_id: i64,
    cost_per_unit: Decimal,
    now: DateTime<Utc>,
) -> RepositoryResult<usize> {
    let items = RecipeItemRepository::list_by_material_tx(conn, material_id)?;
    let mut touched = BTreeSet::new();

    for item in &items {
        let cost = item_cost(item.quantity, item.conversion_ratio, cost_per_unit)?;
        RecipeItemRepository::update_estimated_cost_tx(conn, item.id, cost, now)?;
        touched.insert(item.recipe_id);
    }

    for recipe_id in &touched {
        recompute_recipe_tx(conn, *recipe_id, now)?;
    }

    Ok(touched.len())
}

// ==========================================
// RecipeCostEngine - 配方成本引擎
// ==========================================
pub struct RecipeCostEngine {
    conn: SharedConnection,
}

impl RecipeCostEngine {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 计算配方当前成本（只读）
    ///
    /// # 返回
    /// - Err(NotFound): 配方不存在
    #[instrument(skip(self))]
    pub fn calculate(&self, recipe_id: i64) -> RepositoryResult<Decimal> {
        with_conn(&self.conn, |conn| {
            if RecipeRepository::find_by_id_tx(conn, recipe_id)?.is_none() {
                return Err(RepositoryError::not_found("Recipe", recipe_id));
            }
            let items = RecipeItemRepository::list_by_recipe_tx(conn, recipe_id)?;
            recipe_cost(&items)
        })
    }

    /// 以材料当前单位成本重新计价配方全部项目,并写回配方总成本
    ///
    /// # 返回
    /// - 新的配方总成本
    #[instrument(skip(self))]
    pub fn update(&self, recipe_id: i64) -> RepositoryResult<Decimal> {
        let now = Utc::now();
        let total = with_immediate_tx(&self.conn, |tx| {
            if RecipeRepository::find_by_id_tx(tx, recipe_id)?.is_none() {
                return Err(RepositoryError::not_found("Recipe", recipe_id));
            }
            for item in RecipeItemRepository::list_by_recipe_tx(tx, recipe_id)? {
                let material = MaterialRepository::find_by_id_tx(tx, item.material_id)?
                    .ok_or_else(|| RepositoryError::not_found("Material", item.material_id))?;
                let cost = item_cost(item.quantity, item.conversion_ratio, material.cost_per_unit)?;
                if cost != item.estimated_cost {
                    RecipeItemRepository::update_estimated_cost_tx(tx, item.id, cost, now)?;
                }
            }
            recompute_recipe_tx(tx, recipe_id, now)
        })?;

        info!(recipe_id, total = %total, "配方成本已更新");
        Ok(total)
    }

    /// 材料单位成本变化后重算引用它的配方
    ///
    /// # 返回
    /// - 受影响的配方数
    #[instrument(skip(self))]
    pub fn recalculate_material_costs(&self, material_id: i64) -> RepositoryResult<usize> {
        let now = Utc::now();
        let touched = with_immediate_tx(&self.conn, |tx| {
            let material = MaterialRepository::find_by_id_tx(tx, material_id)?
                .ok_or_else(|| RepositoryError::not_found("Material", material_id))?;
            reprice_material_tx(tx, material_id, material.cost_per_unit, now)
        })?;

        info!(material_id, recipes = touched, "材料成本变化已传导至配方");
        Ok(touched)
    }

    /// 部分更新材料; 单位成本变化时同一事务内重算引用它的配方
    ///
    /// # 返回
    /// - Ok(None): 材料不存在
    #[instrument(skip(self, update))]
    pub fn update_material(
        &self,
        material_id: i64,
        update: MaterialUpdate,
    ) -> RepositoryResult<Option<Material>> {
        let now = Utc::now();
        with_immediate_tx(&self.conn, |tx| {
            let mut material = match MaterialRepository::find_by_id_tx(tx, material_id)? {
                Some(m) => m,
                None => return Ok(None),
            };

            let cost_changed = material.apply_update(update, now);
            MaterialRepository::update_tx(tx, &material)?;

            if cost_changed {
                let touched = reprice_material_tx(tx, material_id, material.cost_per_unit, now)?;
                info!(material_id, recipes = touched, cost = %material.cost_per_unit, "材料单位成本变化,已重算配方");
            }
            Ok(Some(material))
        })
    }
}
