// ==========================================
// 配方成本管理系统 - 材料退役守卫
// ==========================================
// 规则:
// - 无配方项目引用 → 物理删除
// - 仍被引用 → 软停用（is_active = false）,对调用方同样报告成功
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tx::{with_immediate_tx, SharedConnection};
use crate::repository::MaterialRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// 退役结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetirementOutcome {
    /// 已物理删除
    Deleted,
    /// 仍被引用,已停用
    Deactivated,
}

/// 根据引用数决定退役方式
pub fn decide(reference_count: i64) -> RetirementOutcome {
    if reference_count > 0 {
        RetirementOutcome::Deactivated
    } else {
        RetirementOutcome::Deleted
    }
}

// ==========================================
// MaterialRetirementGuard - 材料退役守卫
// ==========================================
pub struct MaterialRetirementGuard {
    conn: SharedConnection,
}

impl MaterialRetirementGuard {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 退役材料
    ///
    /// # 返回
    /// - Ok(RetirementOutcome)
    /// - Err(NotFound): 材料不存在
    #[instrument(skip(self))]
    pub fn retire(&self, material_id: i64) -> RepositoryResult<RetirementOutcome> {
        let now = Utc::now();
        let (outcome, references) = with_immediate_tx(&self.conn, |tx| {
            if MaterialRepository::find_by_id_tx(tx, material_id)?.is_none() {
                return Err(RepositoryError::not_found("Material", material_id));
            }

            let references = MaterialRepository::count_references_tx(tx, material_id)?;
            let outcome = decide(references);
            match outcome {
                RetirementOutcome::Deleted => {
                    MaterialRepository::delete_tx(tx, material_id)?;
                }
                RetirementOutcome::Deactivated => {
                    MaterialRepository::deactivate_tx(tx, material_id, now)?;
                }
            }
            Ok((outcome, references))
        })?;

        match outcome {
            RetirementOutcome::Deleted => info!(material_id, "材料已删除"),
            RetirementOutcome::Deactivated => warn!(
                material_id,
                references, "材料仍被配方项目引用,改为停用"
            ),
        }
        Ok(outcome)
    }
}
