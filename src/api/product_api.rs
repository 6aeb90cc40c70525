// ==========================================
// 配方成本管理系统 - 产品 API
// ==========================================
// 职责: 产品目录查询、维护
// 级联: 删除产品 → 删除其配方与配方项目
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::paging::resolve_page;
use crate::api::validator::{validate_new_product, validate_product_update};
use crate::config::CatalogConfigReader;
use crate::domain::product::{NewProduct, Product, ProductDetail, ProductUpdate};
use crate::domain::query::ListQuery;
use crate::domain::types::ProductCategory;
use crate::repository::ProductRepository;

// ==========================================
// ProductApi - 产品 API
// ==========================================
pub struct ProductApi {
    product_repo: Arc<ProductRepository>,
    config: Arc<dyn CatalogConfigReader>,
}

impl ProductApi {
    pub fn new(
        product_repo: Arc<ProductRepository>,
        config: Arc<dyn CatalogConfigReader>,
    ) -> Self {
        Self {
            product_repo,
            config,
        }
    }

    /// 查询产品列表
    ///
    /// 搜索字段: 名称 / 编码 / 描述（不区分大小写）
    pub fn list_products(&self, query: ListQuery<ProductCategory>) -> ApiResult<Vec<Product>> {
        let page = resolve_page(self.config.as_ref(), query.page, query.page_size)?;
        let products = self.product_repo.list(&query, page)?;
        debug!(count = products.len(), page = page.page, "查询产品列表");
        Ok(products)
    }

    pub fn get_product(&self, id: i64) -> ApiResult<Product> {
        self.product_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})不存在", id)))
    }

    /// 产品详情（含配方,主配方在前）
    pub fn get_product_detail(&self, id: i64) -> ApiResult<ProductDetail> {
        self.product_repo
            .find_detail(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})不存在", id)))
    }

    /// 创建产品
    ///
    /// # 返回
    /// - Err(InvalidOperation): 产品编码重复
    pub fn create_product(&self, mut new: NewProduct) -> ApiResult<Product> {
        validate_new_product(&mut new)?;
        let product = self.product_repo.insert(&new, chrono::Utc::now())?;
        info!(product_id = product.id, code = %product.product_code, "产品已创建");
        Ok(product)
    }

    pub fn update_product(&self, id: i64, mut update: ProductUpdate) -> ApiResult<Product> {
        validate_product_update(&mut update)?;
        let product = self
            .product_repo
            .update(id, update, chrono::Utc::now())?
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})不存在", id)))?;
        info!(product_id = id, "产品已更新");
        Ok(product)
    }

    /// 删除产品（级联删除配方）
    pub fn delete_product(&self, id: i64) -> ApiResult<bool> {
        let affected = self.product_repo.delete(id)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!("Product(id={})不存在", id)));
        }
        info!(product_id = id, "产品已删除（配方级联删除）");
        Ok(true)
    }
}
