// ==========================================
// 配方成本管理系统 - 配方项目数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: (recipe_id, material_id) 唯一; material_id 外键 RESTRICT
// ==========================================

use crate::domain::recipe::{NewRecipeItem, RecipeItem, RecipeItemView};
use crate::repository::error::RepositoryResult;
use crate::repository::row_codec::{decimal_text, get_decimal, get_enum, get_timestamp, timestamp_text};
use crate::repository::tx::{with_conn, SharedConnection};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ITEM_COLUMNS: &str = r#"
    ri.id, ri.recipe_id, ri.material_id, ri.quantity, ri.unit, ri.conversion_ratio,
    ri.sort_order, ri.item_type, ri.is_optional, ri.notes, ri.estimated_cost,
    ri.created_at, ri.updated_at
"#;

// ==========================================
// RecipeItemRepository - 配方项目仓储
// ==========================================
pub struct RecipeItemRepository {
    conn: SharedConnection,
}

impl RecipeItemRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 项目 + 材料名称/单位
    pub fn find_view(&self, item_id: i64) -> RepositoryResult<Option<RecipeItemView>> {
        with_conn(&self.conn, |conn| Self::find_view_tx(conn, item_id))
    }

    /// 配方下全部项目（按 sort_order、材料名排序）
    pub fn list_views_by_recipe(&self, recipe_id: i64) -> RepositoryResult<Vec<RecipeItemView>> {
        with_conn(&self.conn, |conn| Self::list_views_by_recipe_tx(conn, recipe_id))
    }

    // ===== 事务内操作 =====

    pub fn find_by_id_tx(conn: &Connection, item_id: i64) -> RepositoryResult<Option<RecipeItem>> {
        let sql = format!("SELECT {} FROM recipe_items ri WHERE ri.id = ?1", ITEM_COLUMNS);
        let item = conn.query_row(&sql, params![item_id], map_item_row).optional()?;
        Ok(item)
    }

    pub fn find_view_tx(conn: &Connection, item_id: i64) -> RepositoryResult<Option<RecipeItemView>> {
        let sql = format!(
            "SELECT {}, m.name, m.unit FROM recipe_items ri \
             JOIN materials m ON m.id = ri.material_id WHERE ri.id = ?1",
            ITEM_COLUMNS
        );
        let view = conn.query_row(&sql, params![item_id], map_view_row).optional()?;
        Ok(view)
    }

    pub fn list_views_by_recipe_tx(
        conn: &Connection,
        recipe_id: i64,
    ) -> RepositoryResult<Vec<RecipeItemView>> {
        let sql = format!(
            "SELECT {}, m.name, m.unit FROM recipe_items ri \
             JOIN materials m ON m.id = ri.material_id WHERE ri.recipe_id = ?1 \
             ORDER BY ri.sort_order ASC, m.name ASC, ri.id ASC",
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params![recipe_id], map_view_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    /// 配方当前全部项目（成本重算用,事务内新鲜读取）
    pub fn list_by_recipe_tx(conn: &Connection, recipe_id: i64) -> RepositoryResult<Vec<RecipeItem>> {
        let sql = format!(
            "SELECT {} FROM recipe_items ri WHERE ri.recipe_id = ?1 ORDER BY ri.id",
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![recipe_id], map_item_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// 引用某材料的全部项目
    pub fn list_by_material_tx(conn: &Connection, material_id: i64) -> RepositoryResult<Vec<RecipeItem>> {
        let sql = format!(
            "SELECT {} FROM recipe_items ri WHERE ri.material_id = ?1 ORDER BY ri.id",
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![material_id], map_item_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn exists_for_material_tx(
        conn: &Connection,
        recipe_id: i64,
        material_id: i64,
    ) -> RepositoryResult<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM recipe_items WHERE recipe_id = ?1 AND material_id = ?2",
                params![recipe_id, material_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn insert_tx(
        conn: &Connection,
        recipe_id: i64,
        new: &NewRecipeItem,
        estimated_cost: Decimal,
        now: DateTime<Utc>,
    ) -> RepositoryResult<RecipeItem> {
        conn.execute(
            r#"
            INSERT INTO recipe_items (
                recipe_id, material_id, quantity, unit, conversion_ratio, sort_order,
                item_type, is_optional, notes, estimated_cost, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
            params![
                recipe_id,
                new.material_id,
                decimal_text(new.quantity),
                new.unit,
                decimal_text(new.conversion_ratio),
                new.sort_order,
                new.item_type.as_str(),
                new.is_optional,
                new.notes,
                decimal_text(estimated_cost),
                timestamp_text(now),
            ],
        )?;

        Ok(RecipeItem {
            id: conn.last_insert_rowid(),
            recipe_id,
            material_id: new.material_id,
            quantity: new.quantity,
            unit: new.unit.clone(),
            conversion_ratio: new.conversion_ratio,
            sort_order: new.sort_order,
            item_type: new.item_type,
            is_optional: new.is_optional,
            notes: new.notes.clone(),
            estimated_cost,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_tx(conn: &Connection, item: &RecipeItem) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE recipe_items SET
                quantity = ?2, unit = ?3, conversion_ratio = ?4, sort_order = ?5,
                item_type = ?6, is_optional = ?7, notes = ?8, estimated_cost = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                item.id,
                decimal_text(item.quantity),
                item.unit,
                decimal_text(item.conversion_ratio),
                item.sort_order,
                item.item_type.as_str(),
                item.is_optional,
                item.notes,
                decimal_text(item.estimated_cost),
                timestamp_text(item.updated_at),
            ],
        )?;
        Ok(affected)
    }

    pub fn update_estimated_cost_tx(
        conn: &Connection,
        item_id: i64,
        cost: Decimal,
        now: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "UPDATE recipe_items SET estimated_cost = ?2, updated_at = ?3 WHERE id = ?1",
            params![item_id, decimal_text(cost), timestamp_text(now)],
        )?;
        Ok(affected)
    }

    pub fn delete_tx(conn: &Connection, item_id: i64) -> RepositoryResult<usize> {
        let affected = conn.execute("DELETE FROM recipe_items WHERE id = ?1", params![item_id])?;
        Ok(affected)
    }
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<RecipeItem> {
    Ok(RecipeItem {
        id: row.get(0)?,
        recipe_id: row.get(1)?,
        material_id: row.get(2)?,
        quantity: get_decimal(row, 3)?,
        unit: row.get(4)?,
        conversion_ratio: get_decimal(row, 5)?,
        sort_order: row.get(6)?,
        item_type: get_enum(row, 7)?,
        is_optional: row.get(8)?,
        notes: row.get(9)?,
        estimated_cost: get_decimal(row, 10)?,
        created_at: get_timestamp(row, 11)?,
        updated_at: get_timestamp(row, 12)?,
    })
}

fn map_view_row(row: &Row<'_>) -> rusqlite::Result<RecipeItemView> {
    Ok(RecipeItemView {
        item: map_item_row(row)?,
        material_name: row.get(13)?,
        material_unit: row.get(14)?,
    })
}
