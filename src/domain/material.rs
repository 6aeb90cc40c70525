// ==========================================
// 配方成本管理系统 - 材料领域模型
// ==========================================
// 职责: 材料实体、创建/更新请求、使用情况视图
// 红线: 材料不拥有引用它的配方项目 (通过 material_id 外键反查)
// ==========================================

use crate::domain::patch::FieldPatch;
use crate::domain::types::MaterialCategory;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Material - 材料
// ==========================================
// 对齐: materials 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub name: String,                // 唯一, ≤100
    pub description: Option<String>, // ≤500
    pub category: MaterialCategory,
    pub unit: String,            // 标准计价单位, ≤20
    pub cost_per_unit: Decimal,  // 单位成本 (4位小数)
    pub supplier: Option<String>, // ≤200

    // ===== 库存 =====
    pub stock_quantity: Decimal,
    pub minimum_stock: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建材料请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: MaterialCategory,
    pub unit: String,
    pub cost_per_unit: Decimal,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub stock_quantity: Decimal,
    #[serde(default)]
    pub minimum_stock: Decimal,
}

/// 更新材料请求（仅应用出现的字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub description: FieldPatch<String>,
    #[serde(default)]
    pub category: Option<MaterialCategory>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub cost_per_unit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    pub supplier: FieldPatch<String>,
    #[serde(default)]
    pub stock_quantity: Option<Decimal>,
    #[serde(default)]
    pub minimum_stock: Option<Decimal>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Material {
    /// 应用部分更新
    ///
    /// # 返回
    /// - `true`: 单位成本发生变化（调用方需重算引用它的配方）
    pub fn apply_update(&mut self, update: MaterialUpdate, now: DateTime<Utc>) -> bool {
        let previous_cost = self.cost_per_unit;

        if let Some(name) = update.name {
            self.name = name;
        }
        update.description.apply(&mut self.description);
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(cost) = update.cost_per_unit {
            self.cost_per_unit = cost;
        }
        update.supplier.apply(&mut self.supplier);
        if let Some(qty) = update.stock_quantity {
            self.stock_quantity = qty;
        }
        if let Some(min) = update.minimum_stock {
            self.minimum_stock = min;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }

        self.updated_at = now;
        self.cost_per_unit != previous_cost
    }
}

// ==========================================
// MaterialUsage - 材料被配方引用的情况
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub recipe_version: String,
    pub item_id: i64,
    pub quantity: Decimal,
    pub unit: String,
}

/// 材料详情（材料 + 使用情况）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDetail {
    pub material: Material,
    pub usages: Vec<MaterialUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Material {
        let now = Utc::now();
        Material {
            id: 1,
            name: "面粉".to_string(),
            description: Some("高筋".to_string()),
            category: MaterialCategory::RawMaterial,
            unit: "g".to_string(),
            cost_per_unit: Decimal::new(8, 3),
            supplier: Some("一厂".to_string()),
            stock_quantity: Decimal::new(50000, 0),
            minimum_stock: Decimal::new(5000, 0),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_update_only_touches_present_fields() {
        let mut m = sample();
        let update = MaterialUpdate {
            supplier: FieldPatch::Clear,
            stock_quantity: Some(Decimal::new(100, 0)),
            ..Default::default()
        };

        let cost_changed = m.apply_update(update, Utc::now());

        assert!(!cost_changed);
        assert_eq!(m.name, "面粉");
        assert_eq!(m.description.as_deref(), Some("高筋"));
        assert_eq!(m.supplier, None);
        assert_eq!(m.stock_quantity, Decimal::new(100, 0));
    }

    #[test]
    fn test_apply_update_reports_cost_change() {
        let mut m = sample();
        let update = MaterialUpdate {
            cost_per_unit: Some(Decimal::new(1, 2)),
            ..Default::default()
        };
        assert!(m.apply_update(update, Utc::now()));

        // 相同值不算变化
        let update = MaterialUpdate {
            cost_per_unit: Some(Decimal::new(10, 3)),
            ..Default::default()
        };
        assert!(!m.apply_update(update, Utc::now()));
    }
}
