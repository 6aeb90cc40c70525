// ==========================================
// 配方成本管理系统 - 分页参数解析
// ==========================================
// 规则: page ≥ 1; 1 ≤ page_size ≤ 上限; 缺省取配置默认值
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::FieldValidator;
use crate::config::CatalogConfigReader;
use crate::domain::query::PageRequest;

/// 解析分页参数
pub fn resolve_page(
    config: &dyn CatalogConfigReader,
    page: Option<u32>,
    page_size: Option<u32>,
) -> ApiResult<PageRequest> {
    let max = config
        .get_max_page_size()
        .map_err(|e| ApiError::InternalError(format!("读取分页配置失败: {}", e)))?;
    let page_size = match page_size {
        Some(size) => size,
        None => config
            .get_default_page_size()
            .map_err(|e| ApiError::InternalError(format!("读取分页配置失败: {}", e)))?,
    };
    let page = page.unwrap_or(1);

    FieldValidator::new()
        .min_int("page", i64::from(page), 1)
        .int_range("page_size", i64::from(page_size), 1, i64::from(max))
        .finish("分页参数")?;

    Ok(PageRequest { page, page_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    struct FixedConfig;

    impl CatalogConfigReader for FixedConfig {
        fn get_default_page_size(&self) -> Result<u32, Box<dyn Error>> {
            Ok(20)
        }
        fn get_max_page_size(&self) -> Result<u32, Box<dyn Error>> {
            Ok(100)
        }
    }

    #[test]
    fn test_defaults() {
        let p = resolve_page(&FixedConfig, None, None).unwrap();
        assert_eq!(p, PageRequest { page: 1, page_size: 20 });
    }

    #[test]
    fn test_bounds() {
        assert!(resolve_page(&FixedConfig, Some(0), None).is_err());
        assert!(resolve_page(&FixedConfig, Some(1), Some(0)).is_err());
        assert!(resolve_page(&FixedConfig, Some(1), Some(101)).is_err());
        assert!(resolve_page(&FixedConfig, Some(3), Some(100)).is_ok());
    }
}
