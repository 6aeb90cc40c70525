// ==========================================
// 配方成本管理系统 - 材料 API
// ==========================================
// 职责: 材料目录查询、维护、退役
// 规则:
// - 校验先于持久化
// - 单位成本变化时同一事务内重算引用它的配方
// - 删除仍被引用的材料改为停用,对调用方同样返回 true
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::paging::resolve_page;
use crate::api::validator::{validate_material_update, validate_new_material};
use crate::config::CatalogConfigReader;
use crate::domain::material::{Material, MaterialDetail, MaterialUpdate, NewMaterial};
use crate::domain::query::ListQuery;
use crate::domain::types::MaterialCategory;
use crate::engine::{MaterialRetirementGuard, RecipeCostEngine};
use crate::repository::MaterialRepository;

// ==========================================
// MaterialApi - 材料 API
// ==========================================
pub struct MaterialApi {
    material_repo: Arc<MaterialRepository>,
    cost_engine: Arc<RecipeCostEngine>,
    retirement_guard: Arc<MaterialRetirementGuard>,
    config: Arc<dyn CatalogConfigReader>,
}

impl MaterialApi {
    /// 创建新的MaterialApi实例
    pub fn new(
        material_repo: Arc<MaterialRepository>,
        cost_engine: Arc<RecipeCostEngine>,
        retirement_guard: Arc<MaterialRetirementGuard>,
        config: Arc<dyn CatalogConfigReader>,
    ) -> Self {
        Self {
            material_repo,
            cost_engine,
            retirement_guard,
            config,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询材料列表
    ///
    /// # 参数
    /// - query: 搜索词（名称/描述/供应商,不区分大小写）、分类、仅启用、分页
    ///
    /// # 返回
    /// - Ok(Vec<Material>): 按名称升序的一页材料
    /// - Err(ValidationError): 分页参数非法
    pub fn list_materials(&self, query: ListQuery<MaterialCategory>) -> ApiResult<Vec<Material>> {
        let page = resolve_page(self.config.as_ref(), query.page, query.page_size)?;
        let materials = self.material_repo.list(&query, page)?;
        debug!(count = materials.len(), page = page.page, "查询材料列表");
        Ok(materials)
    }

    /// 按 id 查询材料
    pub fn get_material(&self, id: i64) -> ApiResult<Material> {
        self.material_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Material(id={})不存在", id)))
    }

    /// 材料详情（含被哪些配方使用）
    pub fn get_material_detail(&self, id: i64) -> ApiResult<MaterialDetail> {
        let material = self.get_material(id)?;
        let usages = self.material_repo.list_usages(id)?;
        Ok(MaterialDetail { material, usages })
    }

    // ==========================================
    // 维护接口
    // ==========================================

    /// 创建材料
    ///
    /// # 返回
    /// - Err(ValidationError): 字段非法
    /// - Err(InvalidOperation): 名称重复
    pub fn create_material(&self, mut new: NewMaterial) -> ApiResult<Material> {
        validate_new_material(&mut new)?;
        let material = self.material_repo.insert(&new, chrono::Utc::now())?;
        info!(material_id = material.id, name = %material.name, "材料已创建");
        Ok(material)
    }

    /// 部分更新材料
    pub fn update_material(&self, id: i64, mut update: MaterialUpdate) -> ApiResult<Material> {
        validate_material_update(&mut update)?;
        let material = self
            .cost_engine
            .update_material(id, update)?
            .ok_or_else(|| ApiError::NotFound(format!("Material(id={})不存在", id)))?;
        info!(material_id = id, "材料已更新");
        Ok(material)
    }

    /// 删除材料（被引用时停用）
    ///
    /// # 返回
    /// - Ok(true): 已删除或已停用
    /// - Err(NotFound): 材料不存在
    pub fn delete_material(&self, id: i64) -> ApiResult<bool> {
        self.retirement_guard.retire(id)?;
        Ok(true)
    }

    /// 按材料当前单位成本重算引用它的配方
    ///
    /// # 返回
    /// - Ok(usize): 受影响的配方数
    pub fn recalculate_material_costs(&self, id: i64) -> ApiResult<usize> {
        Ok(self.cost_engine.recalculate_material_costs(id)?)
    }
}
