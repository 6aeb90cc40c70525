// ==========================================
// 异步命令层测试
// ==========================================
// 测试范围: JSON 序列化结果、错误载荷、并发命令
// ==========================================

mod helpers;

use std::time::Duration;

use helpers::api_test_helper::*;
use recipe_costing::app::commands;
use recipe_costing::app::ErrorResponse;
use recipe_costing::domain::{ListQuery, Material, NewRecipeItem, Recipe, RecipeItem};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_create_and_list_materials_返回json() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let json = commands::create_material(&env.state, new_material("Flour", "0.01", "g"))
        .await
        .unwrap();
    let flour: Material = serde_json::from_str(&json).unwrap();
    assert_eq!(flour.name, "Flour");

    let json = commands::list_materials(&env.state, ListQuery::search("FLO"))
        .await
        .unwrap();
    let list: Vec<Material> = serde_json::from_str(&json).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, flour.id);

    // 枚举以 SCREAMING_SNAKE_CASE 序列化
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["category"], "RAW_MATERIAL");
}

#[tokio::test]
async fn test_命令错误载荷() {
    let env = ApiTestEnv::new().unwrap();

    let err = commands::get_material(&env.state, 404).await.unwrap_err();
    let resp: ErrorResponse = serde_json::from_str(&err).unwrap();
    assert_eq!(resp.code, "NOT_FOUND");

    let err = commands::create_material(&env.state, new_material(" ", "1", "g"))
        .await
        .unwrap_err();
    let resp: ErrorResponse = serde_json::from_str(&err).unwrap();
    assert_eq!(resp.code, "VALIDATION_ERROR");
    assert_eq!(resp.details.unwrap()["violations"][0]["field"], "name");

    env.product("Bread", "BREAD-001");
    let err = commands::create_product(&env.state, new_product("Other", "BREAD-001"))
        .await
        .unwrap_err();
    let resp: ErrorResponse = serde_json::from_str(&err).unwrap();
    assert_eq!(resp.code, "INVALID_OPERATION");
}

#[tokio::test]
async fn test_配方命令_成本与主配方() {
    let env = ApiTestEnv::new().unwrap();
    let egg = env.material("Egg", "8", "pcs");
    let product = env.product("Omelette", "EGG-001");
    let recipe = env.recipe(product.id, "Basic");

    let json = commands::add_recipe_item(
        &env.state,
        recipe.id,
        NewRecipeItem::new(egg.id, Decimal::from(3), "pcs"),
    )
    .await
    .unwrap();
    let item: RecipeItem = serde_json::from_str(&json).unwrap();
    assert_eq!(item.estimated_cost, d("24"));

    let json = commands::calculate_recipe_cost(&env.state, recipe.id).await.unwrap();
    let cost: Decimal = serde_json::from_str(&json).unwrap();
    assert_eq!(cost, d("24"));

    let json = commands::set_primary_recipe(&env.state, recipe.id).await.unwrap();
    let recipe: Recipe = serde_json::from_str(&json).unwrap();
    assert!(recipe.is_primary);
    assert_eq!(recipe.estimated_cost, d("24"));
}

#[tokio::test]
async fn test_并发命令_成本不变量() {
    let env = ApiTestEnv::new().unwrap();
    let product = env.product("Mix", "MIX-001");
    let recipe = env.recipe(product.id, "Basic");
    let ids: Vec<i64> = (0..5)
        .map(|i| env.material(&format!("M{}", i), "2", "g").id)
        .collect();

    let futures = ids.iter().map(|&material_id| {
        commands::with_timeout(
            Duration::from_secs(10),
            commands::add_recipe_item(
                &env.state,
                recipe.id,
                NewRecipeItem::new(material_id, Decimal::ONE, "g"),
            ),
        )
    });
    let results = futures::future::join_all(futures).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let json = commands::get_recipe(&env.state, recipe.id).await.unwrap();
    let recipe: Recipe = serde_json::from_str(&json).unwrap();
    assert_eq!(recipe.estimated_cost, d("10"));
}
