// ==========================================
// 锻造废料回收系统 - 扩展贡献台账
// ==========================================
// 第三方扩展写入的命名数值贡献: 对体素/锭/板的有符号增减
// 字段逐一校验到 [-128, 127]，越界字段归零并产生校验违规记录；
// 三字段全零的贡献视为空白，不参与聚合
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 贡献字段 (Modifier Field)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierField {
    Voxels, // 体素增减
    Ingots, // 锭数增减
    Plates, // 板数增减
}

impl fmt::Display for ModifierField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierField::Voxels => write!(f, "voxels"),
            ModifierField::Ingots => write!(f, "ingots"),
            ModifierField::Plates => write!(f, "plates"),
        }
    }
}

// ==========================================
// 校验违规记录 (Modifier Violation)
// ==========================================
// 逐字段记录越界值，便于排查行为异常的扩展
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierViolation {
    pub contributor: String,  // 贡献方标识（台账键名）
    pub field: ModifierField, // 越界字段
    pub value: i64,           // 原始越界值
    pub message: String,      // 违规说明
}

// ==========================================
// 原始贡献记录 (Raw Modifier Record)
// ==========================================
// 从属性存储读出的未校验形式，字段可缺省（缺省即 0）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawModifierRecord {
    #[serde(default)]
    pub voxels: Option<i64>,
    #[serde(default)]
    pub ingots: Option<i64>,
    #[serde(default)]
    pub plates: Option<i64>,
}

impl RawModifierRecord {
    pub fn new(voxels: Option<i64>, ingots: Option<i64>, plates: Option<i64>) -> Self {
        Self {
            voxels,
            ingots,
            plates,
        }
    }
}

// ==========================================
// 扩展贡献 (Extension Modifier)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionModifier {
    pub name: String, // 贡献方标识
    pub voxels: i8,
    pub ingots: i8,
    pub plates: i8,
}

impl ExtensionModifier {
    /// 校验一条原始贡献记录
    ///
    /// 每个字段独立校验: 越界字段归零并记录违规，其余字段保留，
    /// 整条贡献不会因单个字段越界而被丢弃；缺省字段静默取 0。
    pub fn validate(name: &str, raw: &RawModifierRecord) -> (Self, Vec<ModifierViolation>) {
        let mut violations = Vec::new();

        let voxels = validated_field(name, ModifierField::Voxels, raw.voxels, &mut violations);
        let ingots = validated_field(name, ModifierField::Ingots, raw.ingots, &mut violations);
        let plates = validated_field(name, ModifierField::Plates, raw.plates, &mut violations);

        (
            Self {
                name: name.to_string(),
                voxels,
                ingots,
                plates,
            },
            violations,
        )
    }

    /// 三字段全零即为空白贡献
    pub fn is_blank(&self) -> bool {
        self.voxels == 0 && self.ingots == 0 && self.plates == 0
    }
}

/// 单字段校验: 缺省取 0，越界归零并记录违规
fn validated_field(
    contributor: &str,
    field: ModifierField,
    value: Option<i64>,
    violations: &mut Vec<ModifierViolation>,
) -> i8 {
    let Some(value) = value else {
        return 0;
    };

    if (i8::MIN as i64..=i8::MAX as i64).contains(&value) {
        return value as i8;
    }

    tracing::error!(
        contributor = contributor,
        field = %field,
        value = value,
        "扩展贡献字段超出 [-128, 127] 范围，该字段归零"
    );

    violations.push(ModifierViolation {
        contributor: contributor.to_string(),
        field,
        value,
        message: format!("字段值 {} 超出 [-128, 127] 范围，已归零", value),
    });

    0
}

// ==========================================
// 聚合结果 (Modifier Totals)
// ==========================================
// 宽位宽累加: i32 可容纳 2^24 条满幅贡献而不溢出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierTotals {
    pub voxels: i32,
    pub ingots: i32,
    pub plates: i32,
}

impl ModifierTotals {
    pub fn is_zero(&self) -> bool {
        self.voxels == 0 && self.ingots == 0 && self.plates == 0
    }
}

// ==========================================
// 扩展贡献台账 (Extension Ledger)
// ==========================================
// 某一工件的全部有效（非空白）贡献，按键名无序存放
#[derive(Debug, Clone, Default)]
pub struct ExtensionLedger {
    modifiers: Vec<ExtensionModifier>,
}

impl ExtensionLedger {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由属性存储读出的原始记录构建台账
    ///
    /// 逐条校验；空白贡献仅记 info 日志后排除。返回台账与
    /// 全部字段级违规记录。
    pub fn from_entries(entries: &[(String, RawModifierRecord)]) -> (Self, Vec<ModifierViolation>) {
        let mut modifiers = Vec::with_capacity(entries.len());
        let mut all_violations = Vec::new();

        for (name, raw) in entries {
            let (modifier, mut violations) = ExtensionModifier::validate(name, raw);
            all_violations.append(&mut violations);

            if modifier.is_blank() {
                tracing::info!(contributor = name.as_str(), "跳过全零的扩展贡献");
                continue;
            }

            modifiers.push(modifier);
        }

        (Self { modifiers }, all_violations)
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn modifiers(&self) -> &[ExtensionModifier] {
        &self.modifiers
    }

    /// 聚合全部有效贡献
    ///
    /// 三个字段独立求和；求和满足交换律，迭代顺序无关紧要。
    pub fn aggregate(&self) -> ModifierTotals {
        let mut totals = ModifierTotals::default();

        for modifier in &self.modifiers {
            totals.voxels += modifier.voxels as i32;
            totals.ingots += modifier.ingots as i32;
            totals.plates += modifier.plates as i32;
        }

        totals
    }
}
