// ==========================================
// 配方成本管理系统 - 目录配置读取 Trait
// ==========================================
// 职责: 定义目录查询所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// CatalogConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait CatalogConfigReader: Send + Sync {
    /// 获取默认每页条数
    ///
    /// # 默认值
    /// - 20（不超过上限）
    fn get_default_page_size(&self) -> Result<u32, Box<dyn Error>>;

    /// 获取每页条数上限
    ///
    /// # 默认值
    /// - 100
    fn get_max_page_size(&self) -> Result<u32, Box<dyn Error>>;
}
