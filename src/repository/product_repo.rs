// ==========================================
// 配方成本管理系统 - 产品数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 级联: 删除产品由外键 ON DELETE CASCADE 带走配方与项目
// ==========================================

use crate::domain::product::{NewProduct, Product, ProductDetail, ProductUpdate};
use crate::domain::query::{ListQuery, PageRequest};
use crate::domain::types::ProductCategory;
use crate::repository::error::RepositoryResult;
use crate::repository::filter_sql::FilterSql;
use crate::repository::row_codec::{decimal_text, get_decimal, get_enum, get_timestamp, timestamp_text};
use crate::repository::recipe_repo::RecipeRepository;
use crate::repository::tx::{with_conn, with_immediate_tx, with_read_tx, SharedConnection};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.product_code, p.description, p.category, p.standard_yield,
    p.yield_unit, p.estimated_production_time_minutes, p.standard_price,
    p.is_active, p.created_at, p.updated_at
"#;

// ==========================================
// ProductRepository - 产品仓储
// ==========================================
pub struct ProductRepository {
    conn: SharedConnection,
}

impl ProductRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Product>> {
        with_conn(&self.conn, |conn| Self::find_by_id_tx(conn, id))
    }

    /// 产品及其配方(主配方在前),同一读事务内读取
    pub fn find_detail(&self, id: i64) -> RepositoryResult<Option<ProductDetail>> {
        with_read_tx(&self.conn, |conn| {
            let product = match Self::find_by_id_tx(conn, id)? {
                Some(p) => p,
                None => return Ok(None),
            };
            let recipes = RecipeRepository::list_by_product_tx(conn, id)?;
            Ok(Some(ProductDetail { product, recipes }))
        })
    }

    pub fn list(
        &self,
        query: &ListQuery<ProductCategory>,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Product>> {
        with_conn(&self.conn, |conn| Self::list_tx(conn, query, page))
    }

    pub fn insert(&self, new: &NewProduct, now: DateTime<Utc>) -> RepositoryResult<Product> {
        with_conn(&self.conn, |conn| Self::insert_tx(conn, new, now))
    }

    /// 读取 → 应用部分更新 → 写回（同一写事务）
    ///
    /// # 返回
    /// - Ok(None): 产品不存在
    pub fn update(
        &self,
        id: i64,
        update: ProductUpdate,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Option<Product>> {
        with_immediate_tx(&self.conn, |tx| {
            let mut product = match Self::find_by_id_tx(tx, id)? {
                Some(p) => p,
                None => return Ok(None),
            };
            product.apply_update(update, now);
            Self::update_tx(tx, &product)?;
            Ok(Some(product))
        })
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        with_conn(&self.conn, |conn| {
            Ok(conn.execute("DELETE FROM products WHERE id = ?1", params![id])?)
        })
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        with_conn(&self.conn, |conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?)
        })
    }

    // ===== 事务内操作 =====

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products p WHERE p.id = ?1", PRODUCT_COLUMNS);
        let product = conn.query_row(&sql, params![id], map_product_row).optional()?;
        Ok(product)
    }

    pub fn exists_tx(conn: &Connection, id: i64) -> RepositoryResult<bool> {
        let found = conn
            .query_row("SELECT 1 FROM products WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn list_tx(
        conn: &Connection,
        query: &ListQuery<ProductCategory>,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Product>> {
        let mut filter = FilterSql::new(&format!("SELECT {} FROM products p", PRODUCT_COLUMNS));
        filter.push_search(
            &["p.name", "p.product_code", "p.description"],
            query.search.as_deref(),
        );
        if let Some(category) = query.category {
            filter.push_eq("p.category", category.as_str().to_string());
        }
        if query.only_active == Some(true) {
            filter.push_raw("p.is_active = 1");
        }
        let (sql, values) = filter.finish("p.name ASC, p.id ASC", Some(page));

        let mut stmt = conn.prepare(&sql)?;
        let products = stmt
            .query_map(params_from_iter(values), map_product_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    pub fn insert_tx(conn: &Connection, new: &NewProduct, now: DateTime<Utc>) -> RepositoryResult<Product> {
        conn.execute(
            r#"
            INSERT INTO products (
                name, product_code, description, category, standard_yield, yield_unit,
                estimated_production_time_minutes, standard_price, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)
            "#,
            params![
                new.name,
                new.product_code,
                new.description,
                new.category.as_str(),
                decimal_text(new.standard_yield),
                new.yield_unit,
                new.estimated_production_time_minutes,
                decimal_text(new.standard_price),
                timestamp_text(now),
            ],
        )?;

        Ok(Product {
            id: conn.last_insert_rowid(),
            name: new.name.clone(),
            product_code: new.product_code.clone(),
            description: new.description.clone(),
            category: new.category,
            standard_yield: new.standard_yield,
            yield_unit: new.yield_unit.clone(),
            estimated_production_time_minutes: new.estimated_production_time_minutes,
            standard_price: new.standard_price,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_tx(conn: &Connection, product: &Product) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE products SET
                name = ?2, product_code = ?3, description = ?4, category = ?5,
                standard_yield = ?6, yield_unit = ?7,
                estimated_production_time_minutes = ?8, standard_price = ?9,
                is_active = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                product.id,
                product.name,
                product.product_code,
                product.description,
                product.category.as_str(),
                decimal_text(product.standard_yield),
                product.yield_unit,
                product.estimated_production_time_minutes,
                decimal_text(product.standard_price),
                product.is_active,
                timestamp_text(product.updated_at),
            ],
        )?;
        Ok(affected)
    }
}

fn map_product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        product_code: row.get(2)?,
        description: row.get(3)?,
        category: get_enum(row, 4)?,
        standard_yield: get_decimal(row, 5)?,
        yield_unit: row.get(6)?,
        estimated_production_time_minutes: row.get(7)?,
        standard_price: get_decimal(row, 8)?,
        is_active: row.get(9)?,
        created_at: get_timestamp(row, 10)?,
        updated_at: get_timestamp(row, 11)?,
    })
}
