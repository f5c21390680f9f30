// ==========================================
// 锻造废料回收系统 - 回收核算引擎
// ==========================================
// 职责: 投料/废料/可回收单元的纯数值换算
// 红线: 除最终取整外全程实数运算，不得提前截断
// 约定: 一切"应发放数量"只向下取整，残余质量作为损耗
// ==========================================

use crate::config::salvage_config::SalvageConfig;
use crate::domain::modifier::ModifierTotals;
use crate::domain::recipe::SmithingRecipe;
use crate::domain::types::MaterialKind;
use crate::domain::work_session::WorkSession;

// ==========================================
// 回收核算引擎 (Recovery Engine)
// ==========================================
#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    config: SalvageConfig,
}

impl RecoveryEngine {
    /// 构造引擎，配置先经过消毒（零分母、越界回收系数回落默认值）
    pub fn new(config: SalvageConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &SalvageConfig {
        &self.config
    }

    /// 单体素的材料质量: materialUnitsPerIngot / voxelsPerIngot
    ///
    /// 实数除法，禁止截断，后续换算全部基于该值。
    pub fn material_units_per_voxel(&self) -> f64 {
        f64::from(self.config.material_units_per_ingot) / f64::from(self.config.voxels_per_ingot)
    }

    /// 单板材的材料质量: voxelsPerPlate * materialUnitsPerVoxel
    pub fn material_units_per_plate(&self) -> f64 {
        f64::from(self.config.voxels_per_plate) * self.material_units_per_voxel()
    }

    /// 会话投料折算的体素总量（不含扩展调整）
    pub fn input_voxels(&self, session: &WorkSession) -> u32 {
        u32::from(session.ingot_count()) * u32::from(self.config.voxels_per_ingot)
            + u32::from(session.plate_count()) * u32::from(self.config.voxels_per_plate)
    }

    /// 会话投料的材料总质量（不含扩展调整）
    pub fn input_material(&self, session: &WorkSession) -> f64 {
        f64::from(session.ingot_count()) * f64::from(self.config.material_units_per_ingot)
            + f64::from(session.plate_count()) * self.material_units_per_plate()
    }

    /// 中止路径: 整件放弃，全部投料质量折算回可回收单元
    ///
    /// # 参数
    /// - `session`: 工件会话的原始计数
    /// - `totals`: 扩展台账聚合净值，锭/板增量并入计数后各自钳制非负，
    ///   体素净值经单体素质量折算并入材料总量
    ///
    /// # 返回
    /// 应发放的可回收单元数，材料总量钳制非负后一次性向下取整
    pub fn total_input_bits(&self, session: &WorkSession, totals: &ModifierTotals) -> u32 {
        let (ingots, plates) = self.effective_counts(session, totals);

        let mut material = f64::from(ingots) * f64::from(self.config.material_units_per_ingot)
            + f64::from(plates) * self.material_units_per_plate();
        material += f64::from(totals.voxels) * self.material_units_per_voxel();

        floor_bits(material.max(0.0), self.config.material_units_per_bit)
    }

    /// 并入扩展调整后的投料体素总量，钳制非负
    pub fn adjusted_input_voxels(&self, session: &WorkSession, totals: &ModifierTotals) -> u32 {
        let (ingots, plates) = self.effective_counts(session, totals);

        let voxels = i64::from(ingots) * i64::from(self.config.voxels_per_ingot)
            + i64::from(plates) * i64::from(self.config.voxels_per_plate)
            + i64::from(totals.voxels);
        voxels.max(0) as u32
    }

    /// 完成路径: 投料体素减去成品所需体素后的废料体素
    ///
    /// 锭/板计数先并入扩展增量并钳制非负，体素净值直接并入
    /// 体素总量；总量与差值各自钳制非负，负废料按 0 处理。
    pub fn waste_voxels(&self, session: &WorkSession, required_voxels: u16, totals: &ModifierTotals) -> u32 {
        let voxels = i64::from(self.adjusted_input_voxels(session, totals));
        let waste = voxels - i64::from(required_voxels);
        waste.max(0) as u32
    }

    /// 废料体素折算的可回收质量，含回收系数
    pub fn waste_material(&self, waste_voxels: u32) -> f64 {
        f64::from(waste_voxels) * self.material_units_per_voxel() * self.config.recovery_modifier
    }

    /// 废料质量向下取整得到的应发放单元数
    pub fn waste_return_bits(&self, waste_voxels: u32) -> u32 {
        floor_bits(self.waste_material(waste_voxels), self.config.material_units_per_bit)
    }

    /// 取整后残余的损耗质量，仅用于提示展示
    pub fn residual_loss(&self, waste_voxels: u32) -> f64 {
        let material = self.waste_material(waste_voxels);
        material % f64::from(self.config.material_units_per_bit)
    }

    /// 配方是否参与回收: 必须有产出且产出不在禁用清单内
    pub fn recipe_is_allowed(&self, recipe: &SmithingRecipe) -> bool {
        match recipe.output() {
            Some(output) => !self.config.is_recipe_disallowed(&output.to_string()),
            None => false,
        }
    }

    /// 放置材料授予的体素量，种类不相关则为 0
    pub fn granted_voxels(&self, kind: MaterialKind, count: u32) -> u32 {
        let per_item = match kind {
            MaterialKind::Ingot => u32::from(self.config.voxels_per_ingot),
            MaterialKind::Plate => u32::from(self.config.voxels_per_plate),
            MaterialKind::Irrelevant => 0,
        };
        per_item * count
    }

    /// 锭/板计数并入扩展增量，各自钳制非负
    fn effective_counts(&self, session: &WorkSession, totals: &ModifierTotals) -> (u32, u32) {
        let ingots = i64::from(session.ingot_count()) + i64::from(totals.ingots);
        let plates = i64::from(session.plate_count()) + i64::from(totals.plates);
        (ingots.max(0) as u32, plates.max(0) as u32)
    }
}

/// 非负质量按单元质量一次性向下取整
fn floor_bits(material: f64, units_per_bit: u8) -> u32 {
    let bits = (material / f64::from(units_per_bit)).floor();
    if bits <= 0.0 {
        0
    } else {
        bits as u32
    }
}
