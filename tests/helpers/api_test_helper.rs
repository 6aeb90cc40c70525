// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use recipe_costing::api::{MaterialApi, ProductApi, RecipeApi};
use recipe_costing::app::AppState;
use recipe_costing::domain::{
    Material, MaterialCategory, NewMaterial, NewProduct, NewRecipe, Product, ProductCategory,
    Recipe,
};

/// 字符串转 Decimal（测试专用）
pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含 AppState 及其API实例
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,
    pub material_api: Arc<MaterialApi>,
    pub product_api: Arc<ProductApi>,
    pub recipe_api: Arc<RecipeApi>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的测试环境（临时数据库文件）
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        recipe_costing::logging::init_test();
        let temp_file = NamedTempFile::new()?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or("临时文件路径不是UTF-8")?
            .to_string();

        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            db_path,
            material_api: state.material_api.clone(),
            product_api: state.product_api.clone(),
            recipe_api: state.recipe_api.clone(),
            state,
            _temp_file: temp_file,
        })
    }

    // ==========================================
    // 测试数据准备
    // ==========================================

    /// 创建原料（默认分类 RAW_MATERIAL）
    pub fn material(&self, name: &str, cost_per_unit: &str, unit: &str) -> Material {
        self.material_api
            .create_material(new_material(name, cost_per_unit, unit))
            .expect("创建材料失败")
    }

    /// 创建食品类产品
    pub fn product(&self, name: &str, code: &str) -> Product {
        self.product_api
            .create_product(new_product(name, code))
            .expect("创建产品失败")
    }

    /// 为产品创建 1.0 版配方
    pub fn recipe(&self, product_id: i64, name: &str) -> Recipe {
        self.recipe_api
            .create_recipe(new_recipe(product_id, name, "1.0"))
            .expect("创建配方失败")
    }
}

pub fn new_material(name: &str, cost_per_unit: &str, unit: &str) -> NewMaterial {
    NewMaterial {
        name: name.to_string(),
        description: None,
        category: MaterialCategory::RawMaterial,
        unit: unit.to_string(),
        cost_per_unit: d(cost_per_unit),
        supplier: None,
        stock_quantity: Decimal::ZERO,
        minimum_stock: Decimal::ZERO,
    }
}

pub fn new_product(name: &str, code: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        product_code: code.to_string(),
        description: None,
        category: ProductCategory::Food,
        standard_yield: Decimal::ONE,
        yield_unit: "pcs".to_string(),
        estimated_production_time_minutes: 60,
        standard_price: Decimal::ZERO,
    }
}

pub fn new_recipe(product_id: i64, name: &str, version: &str) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        version: version.to_string(),
        description: None,
        product_id,
        batch_yield: Decimal::ONE,
        instructions: None,
        created_by: None,
    }
}
