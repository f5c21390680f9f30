// ==========================================
// 锻造废料回收系统 - 回收预估
// ==========================================
// 职责: 面向界面提示的完成路径回收预估
// 约定: 预估只读不写，文案统一走 i18n 词条
// ==========================================

use crate::domain::modifier::ModifierTotals;
use crate::domain::work_session::WorkSession;
use crate::engine::recovery::RecoveryEngine;
use crate::i18n;

/// 残余损耗小于该值视为无损
const LOSS_EPSILON: f64 = 1e-9;

// ==========================================
// 回收预估 (Salvage Estimate)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum SalvageEstimate {
    /// 投料体素不足以完成当前配方
    NeedsMore,
    /// 废料整除回收，无损耗
    NoLoss { bits: u32 },
    /// 取整后有残余损耗
    SomeLoss { bits: u32, units_lost: f64 },
}

impl SalvageEstimate {
    /// 按可投入体素量预估回收结果
    ///
    /// 配方选择对话框用: `available_voxels` 为玩家可贡献料堆
    /// 经授予体素折算后的总量（见 `RecoveryEngine::granted_voxels`）。
    pub fn for_available(engine: &RecoveryEngine, available_voxels: u32, required_voxels: u16) -> Self {
        if available_voxels < u32::from(required_voxels) {
            return Self::NeedsMore;
        }

        Self::from_waste(engine, available_voxels - u32::from(required_voxels))
    }

    /// 按当前投料与配方需求预估完成时的回收结果
    pub fn for_completion(
        engine: &RecoveryEngine,
        session: &WorkSession,
        required_voxels: u16,
        totals: &ModifierTotals,
    ) -> Self {
        let available = engine.adjusted_input_voxels(session, totals);
        Self::for_available(engine, available, required_voxels)
    }

    fn from_waste(engine: &RecoveryEngine, waste_voxels: u32) -> Self {
        let bits = engine.waste_return_bits(waste_voxels);
        let units_lost = engine.residual_loss(waste_voxels);

        if units_lost.abs() < LOSS_EPSILON {
            Self::NoLoss { bits }
        } else {
            Self::SomeLoss { bits, units_lost }
        }
    }

    /// 本地化的界面提示文案
    pub fn hint(&self) -> String {
        match self {
            Self::NeedsMore => i18n::t("estimate.needs_more"),
            Self::NoLoss { bits } => {
                i18n::t_with_args("estimate.no_loss", &[("bits", &bits.to_string())])
            }
            Self::SomeLoss { bits, units_lost } => i18n::t_with_args(
                "estimate.some_loss",
                &[("bits", &bits.to_string()), ("lost", &format!("{units_lost:.1}"))],
            ),
        }
    }
}
