// ==========================================
// 配方成本管理系统 - 配置管理器
// ==========================================
// 职责: 配置查询、写入、快照
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::catalog_config::CatalogConfigReader;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 每页条数上限
pub const MAX_PAGE_SIZE: u32 = 100;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取正整数配置; 缺失或非法时回退默认值
    fn get_positive_u32(&self, key: &str, default: u32) -> Result<u32, Box<dyn Error>> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        match value.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %value,
                    default,
                    "配置值非法，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// CatalogConfigReader Trait 实现
// ==========================================
impl CatalogConfigReader for ConfigManager {
    fn get_default_page_size(&self) -> Result<u32, Box<dyn Error>> {
        let default = self.get_positive_u32(config_keys::CATALOG_DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE)?;
        let max = self.get_max_page_size()?;
        Ok(default.min(max))
    }

    fn get_max_page_size(&self) -> Result<u32, Box<dyn Error>> {
        self.get_positive_u32(config_keys::CATALOG_MAX_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 目录分页
    pub const CATALOG_DEFAULT_PAGE_SIZE: &str = "catalog/default_page_size";
    pub const CATALOG_MAX_PAGE_SIZE: &str = "catalog/max_page_size";
}
