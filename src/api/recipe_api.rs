// ==========================================
// 配方成本管理系统 - 配方 API
// ==========================================
// 职责: 配方目录、配方项目、成本计算、主配方设置
// 规则:
// - 项目增/改/删与配方成本重算在同一事务
// - 同一产品至多一个主配方
// ==========================================

use std::sync::Arc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::paging::resolve_page;
use crate::api::validator::{
    validate_new_recipe, validate_new_recipe_item, validate_recipe_item_update,
    validate_recipe_update,
};
use crate::config::CatalogConfigReader;
use crate::domain::query::RecipeQuery;
use crate::domain::recipe::{
    NewRecipe, NewRecipeItem, Recipe, RecipeDetail, RecipeItem, RecipeItemUpdate, RecipeItemView,
    RecipeUpdate,
};
use crate::engine::{PrimaryRecipeCoordinator, RecipeCostEngine, RecipeEditor, RecipeItemManager};
use crate::repository::{ProductRepository, RecipeRepository};

// ==========================================
// RecipeApi - 配方 API
// ==========================================
pub struct RecipeApi {
    recipe_repo: Arc<RecipeRepository>,
    product_repo: Arc<ProductRepository>,
    editor: Arc<RecipeEditor>,
    item_manager: Arc<RecipeItemManager>,
    cost_engine: Arc<RecipeCostEngine>,
    primary_coordinator: Arc<PrimaryRecipeCoordinator>,
    config: Arc<dyn CatalogConfigReader>,
}

impl RecipeApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recipe_repo: Arc<RecipeRepository>,
        product_repo: Arc<ProductRepository>,
        editor: Arc<RecipeEditor>,
        item_manager: Arc<RecipeItemManager>,
        cost_engine: Arc<RecipeCostEngine>,
        primary_coordinator: Arc<PrimaryRecipeCoordinator>,
        config: Arc<dyn CatalogConfigReader>,
    ) -> Self {
        Self {
            recipe_repo,
            product_repo,
            editor,
            item_manager,
            cost_engine,
            primary_coordinator,
            config,
        }
    }

    fn recipe_not_found(id: i64) -> ApiError {
        ApiError::NotFound(format!("Recipe(id={})不存在", id))
    }

    // ==========================================
    // 配方查询
    // ==========================================

    /// 查询配方列表
    ///
    /// # 参数
    /// - query: 搜索词（配方名/产品名/描述）、状态、产品、分页
    ///
    /// # 返回
    /// - 按产品名、配方名排序的一页配方
    pub fn list_recipes(&self, query: RecipeQuery) -> ApiResult<Vec<Recipe>> {
        let page = resolve_page(self.config.as_ref(), query.page, query.page_size)?;
        let recipes = self.recipe_repo.list(&query, page)?;
        debug!(count = recipes.len(), page = page.page, "查询配方列表");
        Ok(recipes)
    }

    /// 某产品全部配方（主配方在前）
    pub fn list_recipes_by_product(&self, product_id: i64) -> ApiResult<Vec<Recipe>> {
        if self.product_repo.find_by_id(product_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Product(id={})不存在", product_id)));
        }
        Ok(self.recipe_repo.list_by_product(product_id)?)
    }

    pub fn get_recipe(&self, id: i64) -> ApiResult<Recipe> {
        self.recipe_repo
            .find_by_id(id)?
            .ok_or_else(|| Self::recipe_not_found(id))
    }

    /// 配方详情（产品名称/编码 + 项目明细）
    pub fn get_recipe_detail(&self, id: i64) -> ApiResult<RecipeDetail> {
        Ok(self.editor.detail(id)?)
    }

    // ==========================================
    // 配方维护
    // ==========================================

    /// 创建配方（草稿、非主配方、成本 0）
    ///
    /// # 返回
    /// - Err(NotFound): 产品不存在
    /// - Err(InvalidOperation): (产品, 名称, 版本) 重复
    pub fn create_recipe(&self, mut new: NewRecipe) -> ApiResult<Recipe> {
        validate_new_recipe(&mut new)?;
        Ok(self.editor.create(new)?)
    }

    /// 部分更新配方
    pub fn update_recipe(&self, id: i64, mut update: RecipeUpdate) -> ApiResult<Recipe> {
        validate_recipe_update(&mut update)?;
        self.editor
            .update(id, update)?
            .ok_or_else(|| Self::recipe_not_found(id))
    }

    /// 删除配方（级联删除项目）
    pub fn delete_recipe(&self, id: i64) -> ApiResult<bool> {
        let affected = self.recipe_repo.delete(id)?;
        if affected == 0 {
            return Err(Self::recipe_not_found(id));
        }
        info!(recipe_id = id, "配方已删除");
        Ok(true)
    }

    /// 设为主配方（撤销同产品其他主配方）
    pub fn set_primary_recipe(&self, id: i64) -> ApiResult<Recipe> {
        Ok(self.primary_coordinator.set_primary(id)?)
    }

    // ==========================================
    // 成本
    // ==========================================

    /// 计算配方当前成本（不落库）
    pub fn calculate_recipe_cost(&self, id: i64) -> ApiResult<Decimal> {
        Ok(self.cost_engine.calculate(id)?)
    }

    /// 重算并保存配方成本
    pub fn update_recipe_cost(&self, id: i64) -> ApiResult<()> {
        self.cost_engine.update(id)?;
        Ok(())
    }

    // ==========================================
    // 配方项目
    // ==========================================

    /// 添加配方项目
    ///
    /// # 返回
    /// - Err(NotFound): 配方或材料不存在
    /// - Err(InvalidOperation): 材料已在配方中
    pub fn add_recipe_item(&self, recipe_id: i64, mut new: NewRecipeItem) -> ApiResult<RecipeItem> {
        validate_new_recipe_item(&mut new)?;
        Ok(self.item_manager.add_item(recipe_id, new)?)
    }

    pub fn update_recipe_item(
        &self,
        item_id: i64,
        mut update: RecipeItemUpdate,
    ) -> ApiResult<RecipeItem> {
        validate_recipe_item_update(&mut update)?;
        Ok(self.item_manager.update_item(item_id, update)?)
    }

    pub fn delete_recipe_item(&self, item_id: i64) -> ApiResult<bool> {
        self.item_manager.remove_item(item_id)?;
        Ok(true)
    }

    pub fn get_recipe_item(&self, item_id: i64) -> ApiResult<RecipeItemView> {
        Ok(self.item_manager.get_item(item_id)?)
    }

    pub fn list_recipe_items(&self, recipe_id: i64) -> ApiResult<Vec<RecipeItemView>> {
        Ok(self.item_manager.list_items(recipe_id)?)
    }
}
