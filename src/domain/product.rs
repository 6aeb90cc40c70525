// ==========================================
// 配方成本管理系统 - 产品领域模型
// ==========================================
// 职责: 产品实体、创建/更新请求
// 级联: 删除产品 → 删除其全部配方
// ==========================================

use crate::domain::patch::FieldPatch;
use crate::domain::recipe::Recipe;
use crate::domain::types::ProductCategory;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品
// ==========================================
// 对齐: products 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub product_code: String, // 唯一
    pub description: Option<String>,
    pub category: ProductCategory,

    // ===== 生产参数 =====
    pub standard_yield: Decimal, // 标准产量 (>0)
    pub yield_unit: String,
    pub estimated_production_time_minutes: i32,
    pub standard_price: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建产品请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub product_code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: ProductCategory,
    pub standard_yield: Decimal,
    pub yield_unit: String,
    pub estimated_production_time_minutes: i32,
    #[serde(default)]
    pub standard_price: Decimal,
}

/// 更新产品请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub description: FieldPatch<String>,
    #[serde(default)]
    pub category: Option<ProductCategory>,
    #[serde(default)]
    pub standard_yield: Option<Decimal>,
    #[serde(default)]
    pub yield_unit: Option<String>,
    #[serde(default)]
    pub estimated_production_time_minutes: Option<i32>,
    #[serde(default)]
    pub standard_price: Option<Decimal>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Product {
    /// 应用部分更新
    pub fn apply_update(&mut self, update: ProductUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(code) = update.product_code {
            self.product_code = code;
        }
        update.description.apply(&mut self.description);
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(y) = update.standard_yield {
            self.standard_yield = y;
        }
        if let Some(unit) = update.yield_unit {
            self.yield_unit = unit;
        }
        if let Some(minutes) = update.estimated_production_time_minutes {
            self.estimated_production_time_minutes = minutes;
        }
        if let Some(price) = update.standard_price {
            self.standard_price = price;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        self.updated_at = now;
    }
}

/// 产品详情（产品 + 配方列表，主配方在前）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub recipes: Vec<Recipe>,
}
