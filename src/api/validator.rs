// ==========================================
// 配方成本管理系统 - 请求字段校验器
// ==========================================
// 职责: 持久化前的字段级校验 + 数值规范化
// 规则: 数值先按列精度舍入再校验范围,收集全部违规后一次性返回
// ==========================================

use crate::api::error::{ApiError, ApiResult, FieldViolation};
use crate::domain::material::{MaterialUpdate, NewMaterial};
use crate::domain::patch::FieldPatch;
use crate::domain::product::{NewProduct, ProductUpdate};
use crate::domain::recipe::{NewRecipe, NewRecipeItem, RecipeItemUpdate, RecipeUpdate};
use crate::engine::cost_calculator::{round_money, round_quantity, MONEY_MAX, QUANTITY_MAX};
use rust_decimal::Decimal;

// ===== 长度上限（字符数） =====
pub const MATERIAL_NAME_MAX: usize = 100;
pub const MATERIAL_DESCRIPTION_MAX: usize = 500;
pub const UNIT_MAX: usize = 20;
pub const SUPPLIER_MAX: usize = 200;
pub const PRODUCT_NAME_MAX: usize = 100;
pub const PRODUCT_CODE_MAX: usize = 50;
pub const LONG_TEXT_MAX: usize = 1000;
pub const RECIPE_NAME_MAX: usize = 150;
pub const RECIPE_VERSION_MAX: usize = 20;
pub const INSTRUCTIONS_MAX: usize = 2000;
pub const PERSON_MAX: usize = 100;
pub const NOTES_MAX: usize = 300;

// ===== 数值下限 =====
/// 用量、标准产量、配方产量 ≥ 0.001
pub const QUANTITY_MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 3);
/// 换算比例 ≥ 0.000001
pub const RATIO_MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

// ==========================================
// FieldValidator - 违规收集器
// ==========================================
#[derive(Debug, Default)]
pub struct FieldValidator {
    violations: Vec<FieldViolation>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, reason));
    }

    /// 必填文本: 非空白且不超过上限
    pub fn required_text(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "不能为空");
        } else if value.chars().count() > max {
            self.push(field, format!("长度不能超过{}个字符", max));
        }
        self
    }

    /// 可选的必填文本（更新请求中出现即须非空）
    pub fn present_text(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value {
            self.required_text(field, v, max);
        }
        self
    }

    /// 可空文本: 仅校验长度
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.push(field, format!("长度不能超过{}个字符", max));
            }
        }
        self
    }

    pub fn patch_text(&mut self, field: &str, value: &FieldPatch<String>, max: usize) -> &mut Self {
        self.optional_text(field, value.as_set().map(String::as_str), max)
    }

    /// 闭区间 [min, max]
    pub fn decimal_range(
        &mut self,
        field: &str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    ) -> &mut Self {
        if value < min {
            if min.is_zero() {
                self.push(field, "不能为负数");
            } else {
                self.push(field, format!("不能小于{}", min));
            }
        } else if value > max {
            self.push(field, format!("不能超过{}", max));
        }
        self
    }

    pub fn opt_decimal_range(
        &mut self,
        field: &str,
        value: Option<Decimal>,
        min: Decimal,
        max: Decimal,
    ) -> &mut Self {
        if let Some(v) = value {
            self.decimal_range(field, v, min, max);
        }
        self
    }

    /// 金额类: [0, MONEY_MAX]
    pub fn money(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.decimal_range(field, value, Decimal::ZERO, MONEY_MAX)
    }

    pub fn opt_money(&mut self, field: &str, value: Option<Decimal>) -> &mut Self {
        self.opt_decimal_range(field, value, Decimal::ZERO, MONEY_MAX)
    }

    pub fn min_int(&mut self, field: &str, value: i64, min: i64) -> &mut Self {
        if value < min {
            self.push(field, format!("不能小于{}", min));
        }
        self
    }

    pub fn int_range(&mut self, field: &str, value: i64, min: i64, max: i64) -> &mut Self {
        if value < min || value > max {
            self.push(field, format!("必须在{}到{}之间", min, max));
        }
        self
    }

    /// 汇总结果
    pub fn finish(&mut self, context: &str) -> ApiResult<()> {
        if self.violations.is_empty() {
            return Ok(());
        }
        let violations = std::mem::take(&mut self.violations);
        let summary = violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.reason))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ApiError::ValidationError {
            reason: format!("{}校验失败（{}）", context, summary),
            violations,
        })
    }
}

// ==========================================
// 规范化（校验通过后调用）
// ==========================================

fn trim_owned(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value {
        trim_owned(v);
    }
}

// ==========================================
// 材料
// ==========================================

pub fn validate_new_material(new: &mut NewMaterial) -> ApiResult<()> {
    new.cost_per_unit = round_money(new.cost_per_unit);
    new.stock_quantity = round_money(new.stock_quantity);
    new.minimum_stock = round_money(new.minimum_stock);

    FieldValidator::new()
        .required_text("name", &new.name, MATERIAL_NAME_MAX)
        .optional_text("description", new.description.as_deref(), MATERIAL_DESCRIPTION_MAX)
        .required_text("unit", &new.unit, UNIT_MAX)
        .money("cost_per_unit", new.cost_per_unit)
        .optional_text("supplier", new.supplier.as_deref(), SUPPLIER_MAX)
        .money("stock_quantity", new.stock_quantity)
        .money("minimum_stock", new.minimum_stock)
        .finish("材料")?;

    trim_owned(&mut new.name);
    trim_owned(&mut new.unit);
    trim_opt(&mut new.supplier);
    Ok(())
}

pub fn validate_material_update(update: &mut MaterialUpdate) -> ApiResult<()> {
    update.cost_per_unit = update.cost_per_unit.map(round_money);
    update.stock_quantity = update.stock_quantity.map(round_money);
    update.minimum_stock = update.minimum_stock.map(round_money);

    FieldValidator::new()
        .present_text("name", update.name.as_deref(), MATERIAL_NAME_MAX)
        .patch_text("description", &update.description, MATERIAL_DESCRIPTION_MAX)
        .present_text("unit", update.unit.as_deref(), UNIT_MAX)
        .opt_money("cost_per_unit", update.cost_per_unit)
        .patch_text("supplier", &update.supplier, SUPPLIER_MAX)
        .opt_money("stock_quantity", update.stock_quantity)
        .opt_money("minimum_stock", update.minimum_stock)
        .finish("材料")?;

    trim_opt(&mut update.name);
    trim_opt(&mut update.unit);
    Ok(())
}

// ==========================================
// 产品
// ==========================================

pub fn validate_new_product(new: &mut NewProduct) -> ApiResult<()> {
    new.standard_yield = round_quantity(new.standard_yield);
    new.standard_price = round_money(new.standard_price);

    FieldValidator::new()
        .required_text("name", &new.name, PRODUCT_NAME_MAX)
        .required_text("product_code", &new.product_code, PRODUCT_CODE_MAX)
        .optional_text("description", new.description.as_deref(), LONG_TEXT_MAX)
        .decimal_range("standard_yield", new.standard_yield, QUANTITY_MIN, QUANTITY_MAX)
        .required_text("yield_unit", &new.yield_unit, UNIT_MAX)
        .min_int(
            "estimated_production_time_minutes",
            i64::from(new.estimated_production_time_minutes),
            1,
        )
        .money("standard_price", new.standard_price)
        .finish("产品")?;

    trim_owned(&mut new.name);
    trim_owned(&mut new.product_code);
    trim_owned(&mut new.yield_unit);
    Ok(())
}

pub fn validate_product_update(update: &mut ProductUpdate) -> ApiResult<()> {
    update.standard_yield = update.standard_yield.map(round_quantity);
    update.standard_price = update.standard_price.map(round_money);

    let mut validator = FieldValidator::new();
    validator
        .present_text("name", update.name.as_deref(), PRODUCT_NAME_MAX)
        .present_text("product_code", update.product_code.as_deref(), PRODUCT_CODE_MAX)
        .patch_text("description", &update.description, LONG_TEXT_MAX)
        .opt_decimal_range("standard_yield", update.standard_yield, QUANTITY_MIN, QUANTITY_MAX)
        .present_text("yield_unit", update.yield_unit.as_deref(), UNIT_MAX)
        .opt_money("standard_price", update.standard_price);
    if let Some(minutes) = update.estimated_production_time_minutes {
        validator.min_int("estimated_production_time_minutes", i64::from(minutes), 1);
    }
    validator.finish("产品")?;

    trim_opt(&mut update.name);
    trim_opt(&mut update.product_code);
    trim_opt(&mut update.yield_unit);
    Ok(())
}

// ==========================================
// 配方
// ==========================================

pub fn validate_new_recipe(new: &mut NewRecipe) -> ApiResult<()> {
    new.batch_yield = round_quantity(new.batch_yield);

    FieldValidator::new()
        .required_text("name", &new.name, RECIPE_NAME_MAX)
        .required_text("version", &new.version, RECIPE_VERSION_MAX)
        .optional_text("description", new.description.as_deref(), LONG_TEXT_MAX)
        .min_int("product_id", new.product_id, 1)
        .decimal_range("batch_yield", new.batch_yield, QUANTITY_MIN, QUANTITY_MAX)
        .optional_text("instructions", new.instructions.as_deref(), INSTRUCTIONS_MAX)
        .optional_text("created_by", new.created_by.as_deref(), PERSON_MAX)
        .finish("配方")?;

    trim_owned(&mut new.name);
    trim_owned(&mut new.version);
    trim_opt(&mut new.created_by);
    Ok(())
}

pub fn validate_recipe_update(update: &mut RecipeUpdate) -> ApiResult<()> {
    update.batch_yield = update.batch_yield.map(round_quantity);

    let mut validator = FieldValidator::new();
    validator
        .present_text("name", update.name.as_deref(), RECIPE_NAME_MAX)
        .present_text("version", update.version.as_deref(), RECIPE_VERSION_MAX)
        .patch_text("description", &update.description, LONG_TEXT_MAX)
        .opt_decimal_range("batch_yield", update.batch_yield, QUANTITY_MIN, QUANTITY_MAX)
        .patch_text("instructions", &update.instructions, INSTRUCTIONS_MAX)
        .patch_text("approved_by", &update.approved_by, PERSON_MAX);
    if let Some(approver) = update.approved_by.as_set() {
        validator.required_text("approved_by", approver, PERSON_MAX);
    }
    validator.finish("配方")?;

    trim_opt(&mut update.name);
    trim_opt(&mut update.version);
    Ok(())
}

// ==========================================
// 配方项目
// ==========================================

pub fn validate_new_recipe_item(new: &mut NewRecipeItem) -> ApiResult<()> {
    new.quantity = round_quantity(new.quantity);
    new.conversion_ratio = round_quantity(new.conversion_ratio);

    FieldValidator::new()
        .min_int("material_id", new.material_id, 1)
        .decimal_range("quantity", new.quantity, QUANTITY_MIN, QUANTITY_MAX)
        .required_text("unit", &new.unit, UNIT_MAX)
        .decimal_range("conversion_ratio", new.conversion_ratio, RATIO_MIN, QUANTITY_MAX)
        .optional_text("notes", new.notes.as_deref(), NOTES_MAX)
        .finish("配方项目")?;

    trim_owned(&mut new.unit);
    Ok(())
}

pub fn validate_recipe_item_update(update: &mut RecipeItemUpdate) -> ApiResult<()> {
    update.quantity = update.quantity.map(round_quantity);
    update.conversion_ratio = update.conversion_ratio.map(round_quantity);

    FieldValidator::new()
        .opt_decimal_range("quantity", update.quantity, QUANTITY_MIN, QUANTITY_MAX)
        .present_text("unit", update.unit.as_deref(), UNIT_MAX)
        .opt_decimal_range("conversion_ratio", update.conversion_ratio, RATIO_MIN, QUANTITY_MAX)
        .patch_text("notes", &update.notes, NOTES_MAX)
        .finish("配方项目")?;

    trim_opt(&mut update.unit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MaterialCategory;

    fn flour() -> NewMaterial {
        NewMaterial {
            name: "  Flour ".to_string(),
            description: None,
            category: MaterialCategory::RawMaterial,
            unit: "g".to_string(),
            cost_per_unit: Decimal::new(123456, 7),
            supplier: None,
            stock_quantity: Decimal::ZERO,
            minimum_stock: Decimal::ZERO,
        }
    }

    #[test]
    fn test_new_material_normalised() {
        let mut m = flour();
        validate_new_material(&mut m).unwrap();
        assert_eq!(m.name, "Flour");
        assert_eq!(m.cost_per_unit, Decimal::new(123, 4));
    }

    #[test]
    fn test_collects_all_violations() {
        let mut m = flour();
        m.name = "   ".to_string();
        m.unit = "x".repeat(21);
        m.cost_per_unit = Decimal::new(-1, 0);

        match validate_new_material(&mut m) {
            Err(ApiError::ValidationError { violations, .. }) => {
                let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "unit", "cost_per_unit"]);
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_string_in_update_rejected() {
        let mut update = MaterialUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            validate_material_update(&mut update),
            Err(ApiError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_length_counts_chars() {
        let mut m = flour();
        m.name = "麵".repeat(100);
        assert!(validate_new_material(&mut m).is_ok());
        m.name = "麵".repeat(101);
        assert!(validate_new_material(&mut m).is_err());
    }

    #[test]
    fn test_recipe_item_quantity_must_be_positive() {
        let mut item = NewRecipeItem::new(1, Decimal::ZERO, "g");
        assert!(validate_new_recipe_item(&mut item).is_err());

        let mut item = NewRecipeItem::new(1, Decimal::new(15, 1), "g");
        item.conversion_ratio = Decimal::new(-1, 0);
        assert!(validate_new_recipe_item(&mut item).is_err());
    }

    #[test]
    fn test_recipe_update_blank_approver_rejected() {
        let mut update = RecipeUpdate {
            approved_by: FieldPatch::Set(" ".to_string()),
            ..Default::default()
        };
        assert!(validate_recipe_update(&mut update).is_err());

        let mut update = RecipeUpdate {
            approved_by: FieldPatch::Clear,
            ..Default::default()
        };
        assert!(validate_recipe_update(&mut update).is_ok());
    }

    #[test]
    fn test_recipe_item_below_minimum_rejected_after_rounding() {
        // 0.0000001 舍入为 0,不能以 0 用量落库
        let mut item = NewRecipeItem::new(1, Decimal::new(1, 7), "g");
        assert!(validate_new_recipe_item(&mut item).is_err());

        let mut item = NewRecipeItem::new(1, Decimal::new(9, 4), "g");
        assert!(validate_new_recipe_item(&mut item).is_err());

        let mut item = NewRecipeItem::new(1, QUANTITY_MIN, "g");
        item.conversion_ratio = Decimal::new(4, 7);
        assert!(validate_new_recipe_item(&mut item).is_err());

        let mut item = NewRecipeItem::new(1, QUANTITY_MIN, "g");
        item.conversion_ratio = RATIO_MIN;
        validate_new_recipe_item(&mut item).unwrap();
        assert_eq!(item.quantity, QUANTITY_MIN);
    }

    #[test]
    fn test_upper_bounds_follow_column_precision() {
        let mut item = NewRecipeItem::new(1, QUANTITY_MAX, "g");
        assert!(validate_new_recipe_item(&mut item).is_ok());
        let mut item = NewRecipeItem::new(1, QUANTITY_MAX + Decimal::ONE, "g");
        assert!(validate_new_recipe_item(&mut item).is_err());

        let mut m = flour();
        m.cost_per_unit = MONEY_MAX;
        assert!(validate_new_material(&mut m).is_ok());
        m.cost_per_unit = MONEY_MAX + Decimal::ONE;
        match validate_new_material(&mut m) {
            Err(ApiError::ValidationError { violations, .. }) => {
                assert_eq!(violations[0].field, "cost_per_unit");
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_update_quantity_rounding_to_zero_rejected() {
        let mut update = RecipeItemUpdate {
            quantity: Some(Decimal::new(4, 7)),
            ..Default::default()
        };
        assert!(validate_recipe_item_update(&mut update).is_err());

        let mut update = RecipeUpdate {
            batch_yield: Some(Decimal::new(1, 4)),
            ..Default::default()
        };
        assert!(validate_recipe_update(&mut update).is_err());
    }
}
