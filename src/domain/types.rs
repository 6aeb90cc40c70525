// ==========================================
// 配方成本管理系统 - 领域类型定义
// ==========================================
// 约定: 枚举均为普通标签值,不构成状态机
// 存储: SCREAMING_SNAKE_CASE 字符串 (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 材料分类 (Material Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialCategory {
    RawMaterial,  // 原料
    Chemical,     // 化学品
    Packaging,    // 包材
    SemiFinished, // 半成品
    Consumable,   // 耗材
    Other,        // 其他
}

impl MaterialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::RawMaterial => "RAW_MATERIAL",
            MaterialCategory::Chemical => "CHEMICAL",
            MaterialCategory::Packaging => "PACKAGING",
            MaterialCategory::SemiFinished => "SEMI_FINISHED",
            MaterialCategory::Consumable => "CONSUMABLE",
            MaterialCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RAW_MATERIAL" => Ok(MaterialCategory::RawMaterial),
            "CHEMICAL" => Ok(MaterialCategory::Chemical),
            "PACKAGING" => Ok(MaterialCategory::Packaging),
            "SEMI_FINISHED" => Ok(MaterialCategory::SemiFinished),
            "CONSUMABLE" => Ok(MaterialCategory::Consumable),
            "OTHER" => Ok(MaterialCategory::Other),
            other => Err(format!("未知的材料分类: {}", other)),
        }
    }
}

// ==========================================
// 产品分类 (Product Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Food,            // 食品
    Beverage,        // 饮料
    Cosmetics,       // 化妆品
    Pharmaceutical,  // 药品
    Chemical,        // 化工
    Electronics,     // 电子
    MechanicalParts, // 机械零件
    Other,           // 其他
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Food => "FOOD",
            ProductCategory::Beverage => "BEVERAGE",
            ProductCategory::Cosmetics => "COSMETICS",
            ProductCategory::Pharmaceutical => "PHARMACEUTICAL",
            ProductCategory::Chemical => "CHEMICAL",
            ProductCategory::Electronics => "ELECTRONICS",
            ProductCategory::MechanicalParts => "MECHANICAL_PARTS",
            ProductCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FOOD" => Ok(ProductCategory::Food),
            "BEVERAGE" => Ok(ProductCategory::Beverage),
            "COSMETICS" => Ok(ProductCategory::Cosmetics),
            "PHARMACEUTICAL" => Ok(ProductCategory::Pharmaceutical),
            "CHEMICAL" => Ok(ProductCategory::Chemical),
            "ELECTRONICS" => Ok(ProductCategory::Electronics),
            "MECHANICAL_PARTS" => Ok(ProductCategory::MechanicalParts),
            "OTHER" => Ok(ProductCategory::Other),
            other => Err(format!("未知的产品分类: {}", other)),
        }
    }
}

// ==========================================
// 配方状态 (Recipe Status)
// ==========================================
// 无强制流转图: 任意值均可直接设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeStatus {
    Draft,           // 草稿
    PendingApproval, // 待审核
    Approved,        // 已审核
    Published,       // 已发布
    Inactive,        // 停用
    Deprecated,      // 废弃
}

impl RecipeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeStatus::Draft => "DRAFT",
            RecipeStatus::PendingApproval => "PENDING_APPROVAL",
            RecipeStatus::Approved => "APPROVED",
            RecipeStatus::Published => "PUBLISHED",
            RecipeStatus::Inactive => "INACTIVE",
            RecipeStatus::Deprecated => "DEPRECATED",
        }
    }
}

impl Default for RecipeStatus {
    fn default() -> Self {
        RecipeStatus::Draft
    }
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Ok(RecipeStatus::Draft),
            "PENDING_APPROVAL" => Ok(RecipeStatus::PendingApproval),
            "APPROVED" => Ok(RecipeStatus::Approved),
            "PUBLISHED" => Ok(RecipeStatus::Published),
            "INACTIVE" => Ok(RecipeStatus::Inactive),
            "DEPRECATED" => Ok(RecipeStatus::Deprecated),
            other => Err(format!("未知的配方状态: {}", other)),
        }
    }
}

// ==========================================
// 配方项目类型 (Recipe Item Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeItemType {
    MainIngredient, // 主料
    Additive,       // 添加剂
    Seasoning,      // 调味料
    Preservative,   // 防腐剂
    Colorant,       // 色素
    Fragrance,      // 香料
    Catalyst,       // 催化剂
    Other,          // 其他
}

impl RecipeItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeItemType::MainIngredient => "MAIN_INGREDIENT",
            RecipeItemType::Additive => "ADDITIVE",
            RecipeItemType::Seasoning => "SEASONING",
            RecipeItemType::Preservative => "PRESERVATIVE",
            RecipeItemType::Colorant => "COLORANT",
            RecipeItemType::Fragrance => "FRAGRANCE",
            RecipeItemType::Catalyst => "CATALYST",
            RecipeItemType::Other => "OTHER",
        }
    }
}

impl Default for RecipeItemType {
    fn default() -> Self {
        RecipeItemType::MainIngredient
    }
}

impl fmt::Display for RecipeItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MAIN_INGREDIENT" => Ok(RecipeItemType::MainIngredient),
            "ADDITIVE" => Ok(RecipeItemType::Additive),
            "SEASONING" => Ok(RecipeItemType::Seasoning),
            "PRESERVATIVE" => Ok(RecipeItemType::Preservative),
            "COLORANT" => Ok(RecipeItemType::Colorant),
            "FRAGRANCE" => Ok(RecipeItemType::Fragrance),
            "CATALYST" => Ok(RecipeItemType::Catalyst),
            "OTHER" => Ok(RecipeItemType::Other),
            other => Err(format!("未知的配方项目类型: {}", other)),
        }
    }
}
