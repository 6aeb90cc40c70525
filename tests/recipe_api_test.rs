// ==========================================
// RecipeApi 集成测试
// ==========================================
// 测试范围:
// 1. 成本不变量: 配方成本 = Σ 项目成本（每次项目变更后）
// 2. 主配方: 同产品至多一个
// 3. 项目规则: 材料不可重复、配方/材料不存在
// 4. 审核信息: approved_by 与 approved_date 联动
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use recipe_costing::api::ApiError;
use recipe_costing::domain::{
    FieldPatch, NewRecipeItem, RecipeItemType, RecipeItemUpdate, RecipeQuery, RecipeStatus,
    RecipeUpdate,
};
use rust_decimal::Decimal;

/// 断言配方成本等于项目成本之和
fn assert_cost_invariant(env: &ApiTestEnv, recipe_id: i64) {
    let recipe = env.recipe_api.get_recipe(recipe_id).unwrap();
    let sum: Decimal = env
        .recipe_api
        .list_recipe_items(recipe_id)
        .unwrap()
        .iter()
        .map(|v| v.item.estimated_cost)
        .sum();
    assert_eq!(recipe.estimated_cost, sum, "配方成本应等于项目成本之和");
    assert_eq!(env.recipe_api.calculate_recipe_cost(recipe_id).unwrap(), sum);
}

// ==========================================
// 成本场景
// ==========================================

#[test]
fn test_flour_sugar_egg_成本场景() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let flour = env.material("Flour", "0.01", "g");
    let sugar = env.material("Sugar", "0.02", "g");
    let egg = env.material("Egg", "8.00", "pcs");
    let product = env.product("Sponge Cake", "CAKE-001");
    let recipe = env.recipe(product.id, "Classic");
    assert_eq!(recipe.estimated_cost, Decimal::ZERO);
    assert_eq!(recipe.status, RecipeStatus::Draft);
    assert!(!recipe.is_primary);

    let flour_item = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("200"), "g"))
        .unwrap();
    assert_eq!(flour_item.estimated_cost, d("2.00"));
    let sugar_item = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(sugar.id, d("150"), "g"))
        .unwrap();
    assert_eq!(sugar_item.estimated_cost, d("3.00"));
    let egg_item = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(egg.id, d("3"), "pcs"))
        .unwrap();
    assert_eq!(egg_item.estimated_cost, d("24.00"));

    assert_eq!(env.recipe_api.get_recipe(recipe.id).unwrap().estimated_cost, d("29.00"));
    assert_cost_invariant(&env, recipe.id);

    // 删除 Sugar
    assert!(env.recipe_api.delete_recipe_item(sugar_item.id).unwrap());
    assert_eq!(env.recipe_api.get_recipe(recipe.id).unwrap().estimated_cost, d("26.00"));
    assert_cost_invariant(&env, recipe.id);

    // 重新加入 Sugar qty=100
    let mut again = NewRecipeItem::new(sugar.id, d("100"), "g");
    again.item_type = RecipeItemType::Seasoning;
    env.recipe_api.add_recipe_item(recipe.id, again).unwrap();
    assert_eq!(env.recipe_api.get_recipe(recipe.id).unwrap().estimated_cost, d("28.00"));
    assert_cost_invariant(&env, recipe.id);
}

#[test]
fn test_update_recipe_item_重算成本() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.008", "g");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");

    // 以 kg 录入,换算比例 1000
    let mut new = NewRecipeItem::new(flour.id, d("0.5"), "kg");
    new.conversion_ratio = d("1000");
    let item = env.recipe_api.add_recipe_item(recipe.id, new).unwrap();
    assert_eq!(item.estimated_cost, d("4"));

    let updated = env
        .recipe_api
        .update_recipe_item(
            item.id,
            RecipeItemUpdate {
                quantity: Some(d("2")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.estimated_cost, d("16"));
    assert_eq!(updated.unit, "kg");
    assert_cost_invariant(&env, recipe.id);
}

#[test]
fn test_update_recipe_cost_材料改价后显式重算() {
    let env = ApiTestEnv::new().unwrap();
    let egg = env.material("Egg", "8", "pcs");
    let product = env.product("Omelette", "EGG-001");
    let recipe = env.recipe(product.id, "Basic");
    env.recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(egg.id, d("2"), "pcs"))
        .unwrap();

    env.recipe_api.update_recipe_cost(recipe.id).unwrap();
    assert_eq!(env.recipe_api.get_recipe(recipe.id).unwrap().estimated_cost, d("16"));

    let err = env.recipe_api.update_recipe_cost(404).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    let err = env.recipe_api.calculate_recipe_cost(404).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 项目规则
// ==========================================

#[test]
fn test_add_recipe_item_材料重复() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.01", "g");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");
    env.recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("200"), "g"))
        .unwrap();

    let err = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("50"), "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)), "got {:?}", err);

    // 失败的添加不影响成本
    assert_eq!(env.recipe_api.get_recipe(recipe.id).unwrap().estimated_cost, d("2"));
    assert_eq!(env.recipe_api.list_recipe_items(recipe.id).unwrap().len(), 1);
}

#[test]
fn test_add_recipe_item_配方或材料不存在() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.01", "g");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");

    let err = env
        .recipe_api
        .add_recipe_item(999, NewRecipeItem::new(flour.id, d("1"), "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(999, d("1"), "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_add_recipe_item_用量必须为正() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.01", "g");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");

    let err = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, Decimal::ZERO, "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { .. }));
}

#[test]
fn test_add_recipe_item_舍入后为零的用量与比例被拒绝() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.01", "g");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");

    // 0.0000001 按 6 位舍入为 0
    let err = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("0.0000001"), "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { .. }));

    // 低于最小用量 0.001
    let err = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("0.0009"), "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { .. }));

    let mut line = NewRecipeItem::new(flour.id, d("1"), "g");
    line.conversion_ratio = d("0.0000004");
    let err = env.recipe_api.add_recipe_item(recipe.id, line).unwrap_err();
    match err {
        ApiError::ValidationError { violations, .. } => {
            assert_eq!(violations[0].field, "conversion_ratio");
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }

    assert!(env.recipe_api.list_recipe_items(recipe.id).unwrap().is_empty());

    // 更新同样先舍入再校验
    let item = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("0.001"), "g"))
        .unwrap();
    let err = env
        .recipe_api
        .update_recipe_item(
            item.id,
            RecipeItemUpdate {
                quantity: Some(d("0.0000004")),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { .. }));
    let stored = env.recipe_api.get_recipe_item(item.id).unwrap();
    assert_eq!(stored.item.quantity, d("0.001"));
    assert_cost_invariant(&env, recipe.id);
}

#[test]
fn test_add_recipe_item_超大数值_拒绝且连接可用() {
    let env = ApiTestEnv::new().unwrap();
    let gold = env.material("Gold", "99999999999999", "g");
    let product = env.product("Bar", "BAR-001");
    let recipe = env.recipe(product.id, "Basic");

    // 超出数量列精度,校验阶段拒绝
    let err = env
        .recipe_api
        .add_recipe_item(
            recipe.id,
            NewRecipeItem::new(gold.id, d("10000000000000000000000"), "g"),
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { .. }));

    // 各字段在范围内,但乘积超出金额上限
    let mut line = NewRecipeItem::new(gold.id, d("999999999999"), "g");
    line.conversion_ratio = d("999999999999");
    let err = env.recipe_api.add_recipe_item(recipe.id, line).unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)), "got {:?}", err);

    // 失败后同一状态继续可用,且未留下半成品
    assert_eq!(env.material_api.get_material(gold.id).unwrap().id, gold.id);
    assert!(env.recipe_api.list_recipe_items(recipe.id).unwrap().is_empty());
    assert_eq!(env.recipe_api.get_recipe(recipe.id).unwrap().estimated_cost, Decimal::ZERO);
}

#[test]
fn test_add_recipe_item_配方合计超出金额上限() {
    let env = ApiTestEnv::new().unwrap();
    let a = env.material("Saffron", "60000000000000", "g");
    let b = env.material("Truffle", "60000000000000", "g");
    let product = env.product("Luxury", "LUX-001");
    let recipe = env.recipe(product.id, "Basic");

    env.recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(a.id, d("1"), "g"))
        .unwrap();
    let err = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(b.id, d("1"), "g"))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)));

    assert_eq!(env.recipe_api.list_recipe_items(recipe.id).unwrap().len(), 1);
    assert_cost_invariant(&env, recipe.id);
}

#[test]
fn test_多项目成本合计_逐项四舍五入后精确求和() {
    let env = ApiTestEnv::new().unwrap();
    let product = env.product("Mix", "MIX-001");
    let recipe = env.recipe(product.id, "Basic");

    for i in 0..12 {
        let m = env.material(&format!("Spice{:02}", i), "0.3333", "g");
        env.recipe_api
            .add_recipe_item(recipe.id, NewRecipeItem::new(m.id, d("1"), "g"))
            .unwrap();
    }
    // 1.5 × 0.0001 = 0.00015 → 0.0002
    let pinch = env.material("Pinch", "0.0001", "g");
    let item = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(pinch.id, d("1.5"), "g"))
        .unwrap();
    assert_eq!(item.estimated_cost, d("0.0002"));

    let recipe = env.recipe_api.get_recipe(recipe.id).unwrap();
    assert_eq!(recipe.estimated_cost, d("3.9998"));
    assert_cost_invariant(&env, recipe.id);
}

#[test]
fn test_recipe_item_视图含材料信息() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.01", "g");
    let egg = env.material("Egg", "8", "pcs");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");

    let mut egg_line = NewRecipeItem::new(egg.id, d("1"), "pcs");
    egg_line.sort_order = 2;
    env.recipe_api.add_recipe_item(recipe.id, egg_line).unwrap();
    let mut flour_line = NewRecipeItem::new(flour.id, d("100"), "g");
    flour_line.sort_order = 1;
    let flour_item = env.recipe_api.add_recipe_item(recipe.id, flour_line).unwrap();

    let items = env.recipe_api.list_recipe_items(recipe.id).unwrap();
    let names: Vec<_> = items.iter().map(|v| v.material_name.as_str()).collect();
    assert_eq!(names, vec!["Flour", "Egg"]);

    let view = env.recipe_api.get_recipe_item(flour_item.id).unwrap();
    assert_eq!(view.material_name, "Flour");
    assert_eq!(view.material_unit, "g");
    assert_eq!(view.item.recipe_id, recipe.id);

    let detail = env.recipe_api.get_recipe_detail(recipe.id).unwrap();
    assert_eq!(detail.product_name, "Bread");
    assert_eq!(detail.product_code, "BREAD-001");
    assert_eq!(detail.items.len(), 2);
}

#[test]
fn test_delete_recipe_item_不存在() {
    let env = ApiTestEnv::new().unwrap();
    let err = env.recipe_api.delete_recipe_item(12).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 配方维护
// ==========================================

#[test]
fn test_create_recipe_产品不存在() {
    let env = ApiTestEnv::new().unwrap();
    let err = env
        .recipe_api
        .create_recipe(new_recipe(999, "Ghost", "1.0"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)), "got {:?}", err);
}

#[test]
fn test_create_recipe_名称版本重复() {
    let env = ApiTestEnv::new().unwrap();
    let product = env.product("Bread", "BREAD-001");
    env.recipe(product.id, "Basic");

    let err = env
        .recipe_api
        .create_recipe(new_recipe(product.id, "Basic", "1.0"))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)));

    // 新版本可共存
    let v2 = env
        .recipe_api
        .create_recipe(new_recipe(product.id, "Basic", "2.0"))
        .unwrap();
    assert_eq!(v2.version, "2.0");
}

#[test]
fn test_set_primary_recipe_撤销其他主配方() {
    let env = ApiTestEnv::new().unwrap();
    let product = env.product("Bread", "BREAD-001");
    let other_product = env.product("Roll", "BREAD-002");
    let a = env.recipe(product.id, "A");
    let b = env.recipe(product.id, "B");
    let other = env.recipe(other_product.id, "X");

    assert!(env.recipe_api.set_primary_recipe(a.id).unwrap().is_primary);
    env.recipe_api.set_primary_recipe(other.id).unwrap();

    let b = env.recipe_api.set_primary_recipe(b.id).unwrap();
    assert!(b.is_primary);
    assert!(!env.recipe_api.get_recipe(a.id).unwrap().is_primary);
    // 其他产品不受影响
    assert!(env.recipe_api.get_recipe(other.id).unwrap().is_primary);

    let primaries = env
        .recipe_api
        .list_recipes_by_product(product.id)
        .unwrap()
        .into_iter()
        .filter(|r| r.is_primary)
        .count();
    assert_eq!(primaries, 1);
}

#[test]
fn test_update_recipe_主配方标记() {
    let env = ApiTestEnv::new().unwrap();
    let product = env.product("Bread", "BREAD-001");
    let a = env.recipe(product.id, "A");
    let b = env.recipe(product.id, "B");

    let promote = RecipeUpdate {
        is_primary: Some(true),
        ..Default::default()
    };
    env.recipe_api.update_recipe(a.id, promote.clone()).unwrap();
    let b = env.recipe_api.update_recipe(b.id, promote).unwrap();
    assert!(b.is_primary);
    assert!(!env.recipe_api.get_recipe(a.id).unwrap().is_primary);

    let b = env
        .recipe_api
        .update_recipe(
            b.id,
            RecipeUpdate {
                is_primary: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!b.is_primary);
}

#[test]
fn test_update_recipe_审核信息联动() {
    let env = ApiTestEnv::new().unwrap();
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");
    assert!(recipe.approved_date.is_none());

    let approved = env
        .recipe_api
        .update_recipe(
            recipe.id,
            RecipeUpdate {
                status: Some(RecipeStatus::Approved),
                approved_by: FieldPatch::Set("Chef Lin".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(approved.status, RecipeStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some("Chef Lin"));
    assert!(approved.approved_date.is_some());

    let cleared = env
        .recipe_api
        .update_recipe(
            recipe.id,
            RecipeUpdate {
                approved_by: FieldPatch::Clear,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(cleared.approved_by.is_none());
    assert!(cleared.approved_date.is_none());
    assert_eq!(cleared.status, RecipeStatus::Approved);
}

#[test]
fn test_update_recipe_不存在() {
    let env = ApiTestEnv::new().unwrap();
    let err = env
        .recipe_api
        .update_recipe(77, RecipeUpdate::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_delete_recipe_级联删除项目() {
    let env = ApiTestEnv::new().unwrap();
    let flour = env.material("Flour", "0.01", "g");
    let product = env.product("Bread", "BREAD-001");
    let recipe = env.recipe(product.id, "Basic");
    let item = env
        .recipe_api
        .add_recipe_item(recipe.id, NewRecipeItem::new(flour.id, d("1"), "g"))
        .unwrap();

    assert!(env.recipe_api.delete_recipe(recipe.id).unwrap());
    assert!(matches!(
        env.recipe_api.get_recipe_item(item.id).unwrap_err(),
        ApiError::NotFound(_)
    ));
    assert!(matches!(
        env.recipe_api.delete_recipe(recipe.id).unwrap_err(),
        ApiError::NotFound(_)
    ));
}

// ==========================================
// 查询
// ==========================================

#[test]
fn test_list_recipes_搜索与过滤() {
    let env = ApiTestEnv::new().unwrap();
    let bread = env.product("White Bread", "BREAD-001");
    let cake = env.product("Sponge Cake", "CAKE-001");
    env.recipe(bread.id, "Overnight");
    let quick = env.recipe(bread.id, "Quick");
    env.recipe(cake.id, "Classic");

    // 产品名命中
    let found = env
        .recipe_api
        .list_recipes(RecipeQuery {
            search: Some("BREAD".to_string()),
            ..Default::default()
        })
        .unwrap();
    let names: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Overnight", "Quick"]);

    env.recipe_api
        .update_recipe(
            quick.id,
            RecipeUpdate {
                status: Some(RecipeStatus::Published),
                ..Default::default()
            },
        )
        .unwrap();
    let published = env
        .recipe_api
        .list_recipes(RecipeQuery {
            status: Some(RecipeStatus::Published),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id, quick.id);

    let by_product = env
        .recipe_api
        .list_recipes(RecipeQuery {
            product_id: Some(cake.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_product.len(), 1);
    assert_eq!(by_product[0].name, "Classic");
}

#[test]
fn test_list_recipes_by_product_产品不存在() {
    let env = ApiTestEnv::new().unwrap();
    let err = env.recipe_api.list_recipes_by_product(5).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
