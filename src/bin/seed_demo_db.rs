// ==========================================
// 配方成本管理系统 - 演示数据初始化
// ==========================================
// 用法: seed_demo_db [db_path]
// 说明: 已有数据库会先备份再重建; 数据全部经由公开 API 写入
// ==========================================

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Local;
use rust_decimal::Decimal;

use recipe_costing::app::{get_default_db_path, AppState};
use recipe_costing::domain::{
    MaterialCategory, NewMaterial, NewProduct, NewRecipe, NewRecipeItem, ProductCategory,
    RecipeItemType, RecipeStatus, RecipeUpdate,
};
use recipe_costing::logging;

/// (名称, 单位成本, 单位, 供应商)
const DEMO_MATERIALS: [(&str, Decimal, &str, &str); 5] = [
    ("高筋麵粉", Decimal::from_parts(8, 0, 0, false, 3), "g", "聯華製粉"),
    ("砂糖", Decimal::from_parts(5, 0, 0, false, 3), "g", "台糖"),
    ("雞蛋", Decimal::from_parts(8, 0, 0, false, 0), "顆", "大成蛋品"),
    ("無鹽奶油", Decimal::from_parts(2, 0, 0, false, 2), "g", "安佳"),
    ("鹽", Decimal::from_parts(2, 0, 0, false, 3), "g", "台鹽"),
];

fn main() -> anyhow::Result<()> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;

    seed_demo_catalog(&state)?;

    let summary = state.catalog_summary()?;
    eprintln!(
        "Seeded {}: materials={}, products={}, recipes={}",
        db_path, summary.materials, summary.products, summary.recipes
    );

    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_demo_catalog(state: &AppState) -> anyhow::Result<()> {
    // ===== 材料 =====
    let mut material_ids = Vec::with_capacity(DEMO_MATERIALS.len());
    for (name, cost_per_unit, unit, supplier) in DEMO_MATERIALS {
        let material = state.material_api.create_material(NewMaterial {
            name: name.to_string(),
            description: None,
            category: MaterialCategory::RawMaterial,
            unit: unit.to_string(),
            cost_per_unit,
            supplier: Some(supplier.to_string()),
            stock_quantity: Decimal::ZERO,
            minimum_stock: Decimal::ZERO,
        })?;
        material_ids.push(material.id);
    }

    // ===== 产品 =====
    let bread = state.product_api.create_product(NewProduct {
        name: "白土司麵包".to_string(),
        product_code: "BREAD-001".to_string(),
        description: Some("經典白土司".to_string()),
        category: ProductCategory::Food,
        standard_yield: Decimal::from(2),
        yield_unit: "條".to_string(),
        estimated_production_time_minutes: 180,
        standard_price: Decimal::from(45),
    })?;
    state.product_api.create_product(NewProduct {
        name: "奶油小餐包".to_string(),
        product_code: "BREAD-002".to_string(),
        description: Some("柔軟奶油小餐包".to_string()),
        category: ProductCategory::Food,
        standard_yield: Decimal::from(12),
        yield_unit: "個".to_string(),
        estimated_production_time_minutes: 150,
        standard_price: Decimal::from(60),
    })?;

    // ===== 配方 =====
    let recipe = state.recipe_api.create_recipe(NewRecipe {
        name: "白土司標準配方".to_string(),
        version: "1.0".to_string(),
        description: None,
        product_id: bread.id,
        batch_yield: Decimal::from(2),
        instructions: Some("揉麵、一次發酵、整形、二次發酵、烘烤".to_string()),
        created_by: Some("seed".to_string()),
    })?;

    // (材料序号, 用量, 类型)
    let lines = [
        (0, Decimal::from(500), RecipeItemType::MainIngredient),
        (1, Decimal::from(40), RecipeItemType::Seasoning),
        (2, Decimal::from(1), RecipeItemType::MainIngredient),
        (3, Decimal::from(30), RecipeItemType::MainIngredient),
        (4, Decimal::from(8), RecipeItemType::Seasoning),
    ];
    for (sort_order, (idx, quantity, item_type)) in lines.into_iter().enumerate() {
        let (_, _, unit, _) = DEMO_MATERIALS[idx];
        let mut item = NewRecipeItem::new(material_ids[idx], quantity, unit);
        item.item_type = item_type;
        item.sort_order = sort_order as i32;
        state.recipe_api.add_recipe_item(recipe.id, item)?;
    }

    let recipe = state.recipe_api.update_recipe(
        recipe.id,
        RecipeUpdate {
            status: Some(RecipeStatus::Published),
            is_primary: Some(true),
            ..Default::default()
        },
    )?;

    tracing::info!(
        recipe_id = recipe.id,
        estimated_cost = %recipe.estimated_cost,
        "演示配方已建立"
    );
    Ok(())
}
