// ==========================================
// 配方成本管理系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 幂等建表: materials / products / recipes / recipe_items / config_kv
// - 金额/数量以 TEXT 存储,避免 SQLite 转为浮点
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS materials (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL COLLATE NOCASE UNIQUE,
    description     TEXT,
    category        TEXT NOT NULL,
    unit            TEXT NOT NULL,
    cost_per_unit   TEXT NOT NULL,
    supplier        TEXT,
    stock_quantity  TEXT NOT NULL DEFAULT '0',
    minimum_stock   TEXT NOT NULL DEFAULT '0',
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id                                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                                TEXT NOT NULL,
    product_code                        TEXT NOT NULL COLLATE NOCASE UNIQUE,
    description                         TEXT,
    category                            TEXT NOT NULL,
    standard_yield                      TEXT NOT NULL,
    yield_unit                          TEXT NOT NULL,
    estimated_production_time_minutes   INTEGER NOT NULL,
    standard_price                      TEXT NOT NULL DEFAULT '0',
    is_active                           INTEGER NOT NULL DEFAULT 1,
    created_at                          TEXT NOT NULL,
    updated_at                          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recipes (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    version         TEXT NOT NULL,
    description     TEXT,
    product_id      INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    batch_yield     TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'DRAFT',
    is_primary      INTEGER NOT NULL DEFAULT 0,
    instructions    TEXT,
    estimated_cost  TEXT NOT NULL DEFAULT '0',
    created_by      TEXT,
    approved_by     TEXT,
    approved_date   TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (product_id, name, version)
);

-- 每个产品至多一个主配方
CREATE UNIQUE INDEX IF NOT EXISTS ux_recipes_primary_per_product
    ON recipes(product_id) WHERE is_primary = 1;

CREATE TABLE IF NOT EXISTS recipe_items (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id         INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
    material_id       INTEGER NOT NULL REFERENCES materials(id) ON DELETE RESTRICT,
    quantity          TEXT NOT NULL,
    unit              TEXT NOT NULL,
    conversion_ratio  TEXT NOT NULL DEFAULT '1',
    sort_order        INTEGER NOT NULL DEFAULT 0,
    item_type         TEXT NOT NULL DEFAULT 'MAIN_INGREDIENT',
    is_optional       INTEGER NOT NULL DEFAULT 0,
    notes             TEXT,
    estimated_cost    TEXT NOT NULL DEFAULT '0',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    UNIQUE (recipe_id, material_id)
);

CREATE INDEX IF NOT EXISTS idx_recipe_items_material ON recipe_items(material_id);
CREATE INDEX IF NOT EXISTS idx_recipes_product ON recipes(product_id);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（级联删除 / RESTRICT 依赖它）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表并记录 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }
}
