// ==========================================
// 配方成本管理系统 - 列表查询参数
// ==========================================

use serde::{Deserialize, Serialize};

/// 目录列表查询（材料 / 产品）
///
/// - `search`: 不区分大小写的子串搜索
/// - `category`: 分类过滤
/// - `only_active`: 仅返回启用记录
/// - `page` / `page_size`: 1 起始页码; 缺省时取配置默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery<C> {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<C>,
    #[serde(default)]
    pub only_active: Option<bool>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl<C> Default for ListQuery<C> {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            only_active: None,
            page: None,
            page_size: None,
        }
    }
}

impl<C> ListQuery<C> {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn paged(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }
}

/// 配方列表查询
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<crate::domain::types::RecipeStatus>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// 已解析的分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let p = PageRequest { page: 1, page_size: 20 };
        assert_eq!(p.offset(), 0);
        let p = PageRequest { page: 2, page_size: 1 };
        assert_eq!(p.offset(), 1);
        assert_eq!(p.limit(), 1);
    }
}
