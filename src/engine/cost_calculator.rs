// ==========================================
// 配方成本管理系统 - 成本计算器
// ==========================================
// 职责: 纯函数,无 I/O
// 公式:
// - 项目成本 = quantity × conversion_ratio × cost_per_unit（四舍五入到 4 位）
// - 配方成本 = Σ 项目成本
// 溢出或超出金额列上限时返回 CostOverflow,不 panic
// ==========================================

use crate::domain::recipe::RecipeItem;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// 金额小数位
pub const MONEY_DP: u32 = 4;

/// 数量 / 换算比例小数位
pub const QUANTITY_DP: u32 = 6;

/// 金额列上限 99999999999999.9999（18 位有效数字,4 位小数）
pub const MONEY_MAX: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, MONEY_DP);

/// 数量列上限 999999999999.999999（18 位有效数字,6 位小数）
pub const QUANTITY_MAX: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, QUANTITY_DP);

/// 金额规范化（4 位,远离零舍入）
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// 数量 / 比例规范化（6 位,远离零舍入）
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// 计算单个项目成本
///
/// # 参数
/// - quantity: 用量
/// - conversion_ratio: 用量单位 → 材料标准单位
/// - cost_per_unit: 材料单位成本
///
/// # 返回
/// - Err(CostOverflow): 乘积溢出或超出金额列上限
pub fn item_cost(
    quantity: Decimal,
    conversion_ratio: Decimal,
    cost_per_unit: Decimal,
) -> RepositoryResult<Decimal> {
    let raw = quantity
        .checked_mul(conversion_ratio)
        .and_then(|v| v.checked_mul(cost_per_unit))
        .ok_or_else(|| {
            RepositoryError::CostOverflow(format!(
                "{} × {} × {}",
                quantity, conversion_ratio, cost_per_unit
            ))
        })?;
    within_money_limit(round_money(raw))
}

/// 配方总成本 = 各项目已存成本之和
pub fn recipe_cost<'a, I>(items: I) -> RepositoryResult<Decimal>
where
    I: IntoIterator<Item = &'a RecipeItem>,
{
    let total = items.into_iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.estimated_cost).ok_or_else(|| {
            RepositoryError::CostOverflow(format!("配方项目(id={})累加溢出", item.id))
        })
    })?;
    within_money_limit(total)
}

fn within_money_limit(value: Decimal) -> RepositoryResult<Decimal> {
    if value.abs() > MONEY_MAX {
        return Err(RepositoryError::CostOverflow(format!(
            "{} 超出金额上限 {}",
            value, MONEY_MAX
        )));
    }
    Ok(value)
}
