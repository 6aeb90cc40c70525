// ==========================================
// 配方成本管理系统 - 配方数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（主配方互斥、成本重算由引擎负责）
// 约束: (product_id, name, version) 唯一; 每产品至多一个 is_primary=1（部分唯一索引）
// ==========================================

use crate::domain::query::{PageRequest, RecipeQuery};
use crate::domain::recipe::{NewRecipe, Recipe};
use crate::domain::types::RecipeStatus;
use crate::repository::error::RepositoryResult;
use crate::repository::filter_sql::FilterSql;
use crate::repository::row_codec::{
    decimal_text, get_decimal, get_enum, get_opt_timestamp, get_timestamp, timestamp_text,
};
use crate::repository::tx::{with_conn, SharedConnection};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const RECIPE_COLUMNS: &str = r#"
    r.id, r.name, r.version, r.description, r.product_id, r.batch_yield, r.status,
    r.is_primary, r.instructions, r.estimated_cost, r.created_by, r.approved_by,
    r.approved_date, r.created_at, r.updated_at
"#;

// ==========================================
// RecipeRepository - 配方仓储
// ==========================================
pub struct RecipeRepository {
    conn: SharedConnection,
}

impl RecipeRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Recipe>> {
        with_conn(&self.conn, |conn| Self::find_by_id_tx(conn, id))
    }

    pub fn list(&self, query: &RecipeQuery, page: PageRequest) -> RepositoryResult<Vec<Recipe>> {
        with_conn(&self.conn, |conn| Self::list_tx(conn, query, page))
    }

    pub fn list_by_product(&self, product_id: i64) -> RepositoryResult<Vec<Recipe>> {
        with_conn(&self.conn, |conn| Self::list_by_product_tx(conn, product_id))
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        with_conn(&self.conn, |conn| {
            Ok(conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])?)
        })
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        with_conn(&self.conn, |conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?)
        })
    }

    // ===== 事务内操作 =====

    /// 配方所属产品的名称与编码
    pub fn find_product_header_tx(
        conn: &Connection,
        recipe_id: i64,
    ) -> RepositoryResult<Option<(String, String)>> {
        let header = conn
            .query_row(
                r#"
                SELECT p.name, p.product_code
                FROM recipes r JOIN products p ON p.id = r.product_id
                WHERE r.id = ?1
                "#,
                params![recipe_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(header)
    }

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Recipe>> {
        let sql = format!("SELECT {} FROM recipes r WHERE r.id = ?1", RECIPE_COLUMNS);
        let recipe = conn.query_row(&sql, params![id], map_recipe_row).optional()?;
        Ok(recipe)
    }

    /// 列表: 按产品名、配方名排序
    pub fn list_tx(
        conn: &Connection,
        query: &RecipeQuery,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Recipe>> {
        let mut filter = FilterSql::new(&format!(
            "SELECT {} FROM recipes r JOIN products p ON p.id = r.product_id",
            RECIPE_COLUMNS
        ));
        filter.push_search(&["r.name", "p.name", "r.description"], query.search.as_deref());
        if let Some(status) = query.status {
            filter.push_eq("r.status", status.as_str().to_string());
        }
        if let Some(product_id) = query.product_id {
            filter.push_eq("r.product_id", product_id);
        }
        let (sql, values) = filter.finish("p.name ASC, r.name ASC, r.id ASC", Some(page));

        let mut stmt = conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params_from_iter(values), map_recipe_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// 某产品全部配方: 主配方在前,其次按名称
    pub fn list_by_product_tx(conn: &Connection, product_id: i64) -> RepositoryResult<Vec<Recipe>> {
        let sql = format!(
            "SELECT {} FROM recipes r WHERE r.product_id = ?1 \
             ORDER BY r.is_primary DESC, r.name ASC, r.version ASC, r.id ASC",
            RECIPE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params![product_id], map_recipe_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    pub fn insert_tx(conn: &Connection, new: &NewRecipe, now: DateTime<Utc>) -> RepositoryResult<Recipe> {
        conn.execute(
            r#"
            INSERT INTO recipes (
                name, version, description, product_id, batch_yield, status,
                is_primary, instructions, estimated_cost, created_by,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, '0', ?8, ?9, ?9)
            "#,
            params![
                new.name,
                new.version,
                new.description,
                new.product_id,
                decimal_text(new.batch_yield),
                RecipeStatus::Draft.as_str(),
                new.instructions,
                new.created_by,
                timestamp_text(now),
            ],
        )?;

        Ok(Recipe {
            id: conn.last_insert_rowid(),
            name: new.name.clone(),
            version: new.version.clone(),
            description: new.description.clone(),
            product_id: new.product_id,
            batch_yield: new.batch_yield,
            status: RecipeStatus::Draft,
            is_primary: false,
            instructions: new.instructions.clone(),
            estimated_cost: Decimal::ZERO,
            created_by: new.created_by.clone(),
            approved_by: None,
            approved_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// 写回可编辑字段（不含 is_primary / estimated_cost）
    pub fn update_fields_tx(conn: &Connection, recipe: &Recipe) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE recipes SET
                name = ?2, version = ?3, description = ?4, batch_yield = ?5,
                status = ?6, instructions = ?7, approved_by = ?8,
                approved_date = ?9, updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                recipe.id,
                recipe.name,
                recipe.version,
                recipe.description,
                decimal_text(recipe.batch_yield),
                recipe.status.as_str(),
                recipe.instructions,
                recipe.approved_by,
                recipe.approved_date.map(timestamp_text),
                timestamp_text(recipe.updated_at),
            ],
        )?;
        Ok(affected)
    }

    /// 撤销同产品其他配方的主配方标记
    ///
    /// # 返回
    /// - 被撤销的配方数
    pub fn demote_siblings_tx(
        conn: &Connection,
        product_id: i64,
        keep_recipe_id: i64,
        now: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE recipes SET is_primary = 0, updated_at = ?3
            WHERE product_id = ?1 AND id <> ?2 AND is_primary = 1
            "#,
            params![product_id, keep_recipe_id, timestamp_text(now)],
        )?;
        Ok(affected)
    }

    pub fn set_primary_flag_tx(
        conn: &Connection,
        recipe_id: i64,
        is_primary: bool,
        now: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "UPDATE recipes SET is_primary = ?2, updated_at = ?3 WHERE id = ?1",
            params![recipe_id, is_primary, timestamp_text(now)],
        )?;
        Ok(affected)
    }

    pub fn update_estimated_cost_tx(
        conn: &Connection,
        recipe_id: i64,
        cost: Decimal,
        now: DateTime<Utc>,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "UPDATE recipes SET estimated_cost = ?2, updated_at = ?3 WHERE id = ?1",
            params![recipe_id, decimal_text(cost), timestamp_text(now)],
        )?;
        Ok(affected)
    }
}

fn map_recipe_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        description: row.get(3)?,
        product_id: row.get(4)?,
        batch_yield: get_decimal(row, 5)?,
        status: get_enum(row, 6)?,
        is_primary: row.get(7)?,
        instructions: row.get(8)?,
        estimated_cost: get_decimal(row, 9)?,
        created_by: row.get(10)?,
        approved_by: row.get(11)?,
        approved_date: get_opt_timestamp(row, 12)?,
        created_at: get_timestamp(row, 13)?,
        updated_at: get_timestamp(row, 14)?,
    })
}
