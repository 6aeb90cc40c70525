// ==========================================
// 配方成本管理系统 - 材料数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: materials 表 CRUD + 反查引用它的配方项目
// ==========================================

use crate::domain::material::{Material, MaterialUsage, NewMaterial};
use crate::domain::query::{ListQuery, PageRequest};
use crate::domain::types::MaterialCategory;
use crate::repository::error::RepositoryResult;
use crate::repository::filter_sql::FilterSql;
use crate::repository::row_codec::{decimal_text, get_decimal, get_enum, get_timestamp, timestamp_text};
use crate::repository::tx::{with_conn, SharedConnection};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const MATERIAL_COLUMNS: &str = r#"
    m.id, m.name, m.description, m.category, m.unit, m.cost_per_unit, m.supplier,
    m.stock_quantity, m.minimum_stock, m.is_active, m.created_at, m.updated_at
"#;

// ==========================================
// MaterialRepository - 材料仓储
// ==========================================
pub struct MaterialRepository {
    conn: SharedConnection,
}

impl MaterialRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 按 id 查询材料
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Material>> {
        with_conn(&self.conn, |conn| Self::find_by_id_tx(conn, id))
    }

    /// 分页查询材料列表
    pub fn list(
        &self,
        query: &ListQuery<MaterialCategory>,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Material>> {
        with_conn(&self.conn, |conn| Self::list_tx(conn, query, page))
    }

    /// 查询材料被哪些配方使用
    pub fn list_usages(&self, material_id: i64) -> RepositoryResult<Vec<MaterialUsage>> {
        with_conn(&self.conn, |conn| Self::list_usages_tx(conn, material_id))
    }

    /// 插入材料
    pub fn insert(&self, new: &NewMaterial, now: DateTime<Utc>) -> RepositoryResult<Material> {
        with_conn(&self.conn, |conn| Self::insert_tx(conn, new, now))
    }

    /// 材料总数
    pub fn count(&self) -> RepositoryResult<i64> {
        with_conn(&self.conn, |conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM materials", [], |row| row.get(0))?)
        })
    }

    // ==========================================
    // 连接/事务内操作（供引擎在同一事务中调用）
    // ==========================================

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Material>> {
        let sql = format!("SELECT {} FROM materials m WHERE m.id = ?1", MATERIAL_COLUMNS);
        let material = conn
            .query_row(&sql, params![id], map_material_row)
            .optional()?;
        Ok(material)
    }

    pub fn list_tx(
        conn: &Connection,
        query: &ListQuery<MaterialCategory>,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Material>> {
        let mut filter = FilterSql::new(&format!("SELECT {} FROM materials m", MATERIAL_COLUMNS));
        filter.push_search(
            &["m.name", "m.description", "m.supplier"],
            query.search.as_deref(),
        );
        if let Some(category) = query.category {
            filter.push_eq("m.category", category.as_str().to_string());
        }
        if query.only_active == Some(true) {
            filter.push_raw("m.is_active = 1");
        }
        let (sql, values) = filter.finish("m.name ASC, m.id ASC", Some(page));

        let mut stmt = conn.prepare(&sql)?;
        let materials = stmt
            .query_map(params_from_iter(values), map_material_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(materials)
    }

    pub fn insert_tx(
        conn: &Connection,
        new: &NewMaterial,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Material> {
        conn.execute(
            r#"
            INSERT INTO materials (
                name, description, category, unit, cost_per_unit, supplier,
                stock_quantity, minimum_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)
            "#,
            params![
                new.name,
                new.description,
                new.category.as_str(),
                new.unit,
                decimal_text(new.cost_per_unit),
                new.supplier,
                decimal_text(new.stock_quantity),
                decimal_text(new.minimum_stock),
                timestamp_text(now),
            ],
        )?;

        Ok(Material {
            id: conn.last_insert_rowid(),
            name: new.name.clone(),
            description: new.description.clone(),
            category: new.category,
            unit: new.unit.clone(),
            cost_per_unit: new.cost_per_unit,
            supplier: new.supplier.clone(),
            stock_quantity: new.stock_quantity,
            minimum_stock: new.minimum_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// 整行覆盖写回（id 不变）
    pub fn update_tx(conn: &Connection, material: &Material) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE materials SET
                name = ?2, description = ?3, category = ?4, unit = ?5,
                cost_per_unit = ?6, supplier = ?7, stock_quantity = ?8,
                minimum_stock = ?9, is_active = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                material.id,
                material.name,
                material.description,
                material.category.as_str(),
                material.unit,
                decimal_text(material.cost_per_unit),
                material.supplier,
                decimal_text(material.stock_quantity),
                decimal_text(material.minimum_stock),
                material.is_active,
                timestamp_text(material.updated_at),
            ],
        )?;
        Ok(affected)
    }

    /// 软停用
    pub fn deactivate_tx(conn: &Connection, id: i64, now: DateTime<Utc>) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "UPDATE materials SET is_active = 0, updated_at = ?2 WHERE id = ?1",
            params![id, timestamp_text(now)],
        )?;
        Ok(affected)
    }

    pub fn delete_tx(conn: &Connection, id: i64) -> RepositoryResult<usize> {
        let affected = conn.execute("DELETE FROM materials WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    /// 引用该材料的配方项目数
    pub fn count_references_tx(conn: &Connection, material_id: i64) -> RepositoryResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM recipe_items WHERE material_id = ?1",
            params![material_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_usages_tx(conn: &Connection, material_id: i64) -> RepositoryResult<Vec<MaterialUsage>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.name, r.version, ri.id, ri.quantity, ri.unit
            FROM recipe_items ri
            JOIN recipes r ON r.id = ri.recipe_id
            WHERE ri.material_id = ?1
            ORDER BY r.name ASC, r.version ASC, ri.id ASC
            "#,
        )?;
        let usages = stmt
            .query_map(params![material_id], |row| {
                Ok(MaterialUsage {
                    recipe_id: row.get(0)?,
                    recipe_name: row.get(1)?,
                    recipe_version: row.get(2)?,
                    item_id: row.get(3)?,
                    quantity: get_decimal(row, 4)?,
                    unit: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usages)
    }
}

fn map_material_row(row: &Row<'_>) -> rusqlite::Result<Material> {
    Ok(Material {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: get_enum(row, 3)?,
        unit: row.get(4)?,
        cost_per_unit: get_decimal(row, 5)?,
        supplier: row.get(6)?,
        stock_quantity: get_decimal(row, 7)?,
        minimum_stock: get_decimal(row, 8)?,
        is_active: row.get(9)?,
        created_at: get_timestamp(row, 10)?,
        updated_at: get_timestamp(row, 11)?,
    })
}
