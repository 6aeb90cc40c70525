// ==========================================
// 配方成本管理系统 - 异步命令层
// ==========================================
// 职责: 将同步 API 包装为 async 命令（spawn_blocking + JSON 序列化）
// 约定: 成功返回 JSON 字符串; 失败返回 {code, message, details} JSON 字符串
// ==========================================

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;
use crate::domain::material::{MaterialUpdate, NewMaterial};
use crate::domain::product::{NewProduct, ProductUpdate};
use crate::domain::query::{ListQuery, RecipeQuery};
use crate::domain::recipe::{NewRecipe, NewRecipeItem, RecipeItemUpdate, RecipeUpdate};
use crate::domain::types::{MaterialCategory, ProductCategory};

// ==========================================
// 公共工具：错误映射、阻塞任务执行
// ==========================================

/// 错误响应（返回给调用方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

/// 将ApiError转换为JSON字符串
pub fn map_api_error(err: ApiError) -> String {
    let error_response = ErrorResponse {
        code: err.code().to_string(),
        message: err.to_string(),
        details: match &err {
            ApiError::ValidationError { violations, .. } if !violations.is_empty() => {
                Some(serde_json::json!({ "violations": violations }))
            }
            _ => None,
        },
    };

    serde_json::to_string(&error_response).unwrap_or_else(|_| err.to_string())
}

async fn run_blocking<T, F>(f: F) -> Result<String, String>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| format!("任务执行失败: {}", e))?
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 为命令设置等待超时
///
/// 超时只放弃等待; 已提交到阻塞线程池的操作会照常完成或回滚。
pub async fn with_timeout<F>(duration: Duration, fut: F) -> Result<String, String>
where
    F: Future<Output = Result<String, String>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = duration.as_millis() as u64, "命令等待超时");
            let response = ErrorResponse {
                code: "TIMEOUT".to_string(),
                message: format!("等待超时（{}ms）", duration.as_millis()),
                details: None,
            };
            Err(serde_json::to_string(&response).unwrap_or(response.message))
        }
    }
}

// ==========================================
// 材料相关命令
// ==========================================

/// 查询材料列表
pub async fn list_materials(
    state: &AppState,
    query: ListQuery<MaterialCategory>,
) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.list_materials(query)).await
}

pub async fn get_material(state: &AppState, id: i64) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.get_material(id)).await
}

/// 查询材料详情（含使用它的配方）
pub async fn get_material_detail(state: &AppState, id: i64) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.get_material_detail(id)).await
}

pub async fn create_material(state: &AppState, new: NewMaterial) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.create_material(new)).await
}

pub async fn update_material(
    state: &AppState,
    id: i64,
    update: MaterialUpdate,
) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.update_material(id, update)).await
}

/// 删除材料（被引用时改为停用）
pub async fn delete_material(state: &AppState, id: i64) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.delete_material(id)).await
}

pub async fn recalculate_material_costs(state: &AppState, id: i64) -> Result<String, String> {
    let material_api = state.material_api.clone();
    run_blocking(move || material_api.recalculate_material_costs(id)).await
}

// ==========================================
// 产品相关命令
// ==========================================

pub async fn list_products(
    state: &AppState,
    query: ListQuery<ProductCategory>,
) -> Result<String, String> {
    let product_api = state.product_api.clone();
    run_blocking(move || product_api.list_products(query)).await
}

pub async fn get_product(state: &AppState, id: i64) -> Result<String, String> {
    let product_api = state.product_api.clone();
    run_blocking(move || product_api.get_product(id)).await
}

/// 查询产品详情（含全部配方）
pub async fn get_product_detail(state: &AppState, id: i64) -> Result<String, String> {
    let product_api = state.product_api.clone();
    run_blocking(move || product_api.get_product_detail(id)).await
}

pub async fn create_product(state: &AppState, new: NewProduct) -> Result<String, String> {
    let product_api = state.product_api.clone();
    run_blocking(move || product_api.create_product(new)).await
}

pub async fn update_product(
    state: &AppState,
    id: i64,
    update: ProductUpdate,
) -> Result<String, String> {
    let product_api = state.product_api.clone();
    run_blocking(move || product_api.update_product(id, update)).await
}

/// 删除产品（级联删除配方与项目）
pub async fn delete_product(state: &AppState, id: i64) -> Result<String, String> {
    let product_api = state.product_api.clone();
    run_blocking(move || product_api.delete_product(id)).await
}

// ==========================================
// 配方相关命令
// ==========================================

pub async fn list_recipes(state: &AppState, query: RecipeQuery) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.list_recipes(query)).await
}

pub async fn list_recipes_by_product(state: &AppState, product_id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.list_recipes_by_product(product_id)).await
}

pub async fn get_recipe(state: &AppState, id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.get_recipe(id)).await
}

pub async fn get_recipe_detail(state: &AppState, id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.get_recipe_detail(id)).await
}

pub async fn create_recipe(state: &AppState, new: NewRecipe) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.create_recipe(new)).await
}

pub async fn update_recipe(
    state: &AppState,
    id: i64,
    update: RecipeUpdate,
) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.update_recipe(id, update)).await
}

pub async fn delete_recipe(state: &AppState, id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.delete_recipe(id)).await
}

/// 设为主配方
pub async fn set_primary_recipe(state: &AppState, id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.set_primary_recipe(id)).await
}

/// 计算配方成本（不落库）
pub async fn calculate_recipe_cost(state: &AppState, id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || -> ApiResult<Decimal> { recipe_api.calculate_recipe_cost(id) }).await
}

/// 重算并保存配方成本
pub async fn update_recipe_cost(state: &AppState, id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.update_recipe_cost(id)).await
}

// ==========================================
// 配方项目相关命令
// ==========================================

pub async fn add_recipe_item(
    state: &AppState,
    recipe_id: i64,
    new: NewRecipeItem,
) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.add_recipe_item(recipe_id, new)).await
}

pub async fn update_recipe_item(
    state: &AppState,
    item_id: i64,
    update: RecipeItemUpdate,
) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.update_recipe_item(item_id, update)).await
}

pub async fn delete_recipe_item(state: &AppState, item_id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.delete_recipe_item(item_id)).await
}

pub async fn get_recipe_item(state: &AppState, item_id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.get_recipe_item(item_id)).await
}

pub async fn list_recipe_items(state: &AppState, recipe_id: i64) -> Result<String, String> {
    let recipe_api = state.recipe_api.clone();
    run_blocking(move || recipe_api.list_recipe_items(recipe_id)).await
}
