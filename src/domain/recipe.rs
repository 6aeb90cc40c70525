// ==========================================
// 配方成本管理系统 - 配方领域模型
// ==========================================
// 职责: 配方 / 配方项目实体、创建/更新请求、详情视图
// 红线: estimated_cost 为派生值,调用方不可直接设置
// ==========================================

use crate::domain::patch::FieldPatch;
use crate::domain::types::{RecipeItemType, RecipeStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Recipe - 配方
// ==========================================
// 对齐: recipes 表; (product_id, name, version) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub product_id: i64,
    pub batch_yield: Decimal,
    pub status: RecipeStatus,
    pub is_primary: bool,
    pub instructions: Option<String>,

    /// 配方总成本 = Σ 项目成本（派生）
    pub estimated_cost: Decimal,

    // ===== 审计 =====
    pub created_by: Option<String>,
    pub approved_by: Option<String>,
    pub approved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建配方请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub product_id: i64,
    pub batch_yield: Decimal,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// 更新配方请求
///
/// `is_primary = Some(true)` 会先撤销同产品其他配方的主配方标记
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub description: FieldPatch<String>,
    #[serde(default)]
    pub batch_yield: Option<Decimal>,
    #[serde(default)]
    pub status: Option<RecipeStatus>,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub instructions: FieldPatch<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub approved_by: FieldPatch<String>,
}

impl Recipe {
    /// 应用部分更新（主配方标记除外,由主配方协调器处理）
    ///
    /// 审核人被设置时同步刷新审核时间; 被清空时审核时间一并清空
    pub fn apply_update(&mut self, update: RecipeUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(version) = update.version {
            self.version = version;
        }
        update.description.apply(&mut self.description);
        if let Some(batch_yield) = update.batch_yield {
            self.batch_yield = batch_yield;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(is_primary) = update.is_primary {
            self.is_primary = is_primary;
        }
        update.instructions.apply(&mut self.instructions);

        match update.approved_by {
            FieldPatch::Keep => {}
            FieldPatch::Set(approver) => {
                self.approved_by = Some(approver);
                self.approved_date = Some(now);
            }
            FieldPatch::Clear => {
                self.approved_by = None;
                self.approved_date = None;
            }
        }

        self.updated_at = now;
    }
}

// ==========================================
// RecipeItem - 配方项目
// ==========================================
// 对齐: recipe_items 表; (recipe_id, material_id) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    pub id: i64,
    pub recipe_id: i64,
    pub material_id: i64,
    pub quantity: Decimal,         // 6位小数
    pub unit: String,
    pub conversion_ratio: Decimal, // 本单位 → 材料标准单位
    pub sort_order: i32,
    pub item_type: RecipeItemType,
    pub is_optional: bool,
    pub notes: Option<String>,

    /// 项目成本 = quantity × conversion_ratio × material.cost_per_unit（派生）
    pub estimated_cost: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_conversion_ratio() -> Decimal {
    Decimal::ONE
}

/// 新增配方项目请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipeItem {
    pub material_id: i64,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default = "default_conversion_ratio")]
    pub conversion_ratio: Decimal,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub item_type: RecipeItemType,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewRecipeItem {
    /// 以默认值创建请求（换算比例 1、主料、非可选）
    pub fn new(material_id: i64, quantity: Decimal, unit: impl Into<String>) -> Self {
        Self {
            material_id,
            quantity,
            unit: unit.into(),
            conversion_ratio: default_conversion_ratio(),
            sort_order: 0,
            item_type: RecipeItemType::default(),
            is_optional: false,
            notes: None,
        }
    }
}

/// 更新配方项目请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeItemUpdate {
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub conversion_ratio: Option<Decimal>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub item_type: Option<RecipeItemType>,
    #[serde(default)]
    pub is_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub notes: FieldPatch<String>,
}

impl RecipeItem {
    /// 应用部分更新（成本由调用方重算）
    pub fn apply_update(&mut self, update: RecipeItemUpdate, now: DateTime<Utc>) {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(ratio) = update.conversion_ratio {
            self.conversion_ratio = ratio;
        }
        if let Some(order) = update.sort_order {
            self.sort_order = order;
        }
        if let Some(item_type) = update.item_type {
            self.item_type = item_type;
        }
        if let Some(optional) = update.is_optional {
            self.is_optional = optional;
        }
        update.notes.apply(&mut self.notes);
        self.updated_at = now;
    }
}

// ==========================================
// 详情视图
// ==========================================

/// 配方项目 + 材料名称/单位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeItemView {
    #[serde(flatten)]
    pub item: RecipeItem,
    pub material_name: String,
    pub material_unit: String,
}

/// 配方详情（配方 + 产品 + 项目明细）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub product_name: String,
    pub product_code: String,
    pub items: Vec<RecipeItemView>,
}
