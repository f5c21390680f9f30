// ==========================================
// 锻造废料回收系统 - 回收配置
// ==========================================
// 职责: 配置解析、校验与修复
// 存储: 宿主负责配置文件读写，本核心只处理解析后的 JSON 值；
// 解析永不失败，越界/缺失一律修复为默认值并要求宿主回写
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// ==========================================
// 默认值
// ==========================================
// 基于宿主游戏的标准行为，仅当其他扩展改变放料行为时才需调整
pub const DEFAULT_VOXELS_PER_INGOT: u8 = 42;
pub const DEFAULT_VOXELS_PER_PLATE: u8 = 81;
pub const DEFAULT_MATERIAL_UNITS_PER_INGOT: u16 = 100;
pub const DEFAULT_MATERIAL_UNITS_PER_BIT: u8 = 5;
pub const DEFAULT_RECOVERY_MODIFIER: f64 = 1.0;

/// 回收效率系数的可接受区间
const RECOVERY_MODIFIER_RANGE: (f64, f64) = (0.0, 2.0);

// ==========================================
// 回收配置 (Salvage Config)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalvageConfig {
    pub voxels_per_ingot: u8,            // 一锭对应的体素数
    pub voxels_per_plate: u8,            // 一板对应的体素数
    pub material_units_per_ingot: u16,   // 一锭的材料单位量
    pub material_units_per_bit: u8,      // 一个碎料的材料单位量
    pub recovery_modifier: f64,          // 回收效率系数 [0.0, 2.0]
    pub disallowed_recipes: HashSet<String>, // 禁用回收的配方产出标识
}

impl Default for SalvageConfig {
    fn default() -> Self {
        Self {
            voxels_per_ingot: DEFAULT_VOXELS_PER_INGOT,
            voxels_per_plate: DEFAULT_VOXELS_PER_PLATE,
            material_units_per_ingot: DEFAULT_MATERIAL_UNITS_PER_INGOT,
            material_units_per_bit: DEFAULT_MATERIAL_UNITS_PER_BIT,
            recovery_modifier: DEFAULT_RECOVERY_MODIFIER,
            disallowed_recipes: HashSet::new(),
        }
    }
}

impl SalvageConfig {
    /// 从宿主提供的 JSON 值解析配置
    ///
    /// # 参数
    /// - json: 宿主读入并解析后的配置 JSON
    ///
    /// # 返回
    /// - SalvageConfig: 可直接使用的配置（缺失/越界键已修复为默认值）
    /// - bool: 是否需要宿主回写配置文件（发生过任何修复或缺省补全）
    pub fn parse_from_json(json: &Value) -> (Self, bool) {
        let Some(obj) = json.as_object() else {
            tracing::warn!("配置 JSON 根节点不是对象，使用默认配置");
            return (Self::default(), true);
        };

        let mut needs_rewrite = false;

        let (voxels_per_ingot, valid) = parse_byte_key(
            obj,
            config_keys::VOXELS_PER_INGOT,
            DEFAULT_VOXELS_PER_INGOT,
        );
        needs_rewrite = needs_rewrite || !valid;

        let (voxels_per_plate, valid) = parse_byte_key(
            obj,
            config_keys::VOXELS_PER_PLATE,
            DEFAULT_VOXELS_PER_PLATE,
        );
        needs_rewrite = needs_rewrite || !valid;

        let (material_units_per_ingot, valid) = parse_ushort_key(
            obj,
            config_keys::MATERIAL_UNITS_PER_INGOT,
            DEFAULT_MATERIAL_UNITS_PER_INGOT,
        );
        needs_rewrite = needs_rewrite || !valid;

        let (material_units_per_bit, valid) = parse_byte_key(
            obj,
            config_keys::MATERIAL_UNITS_PER_BIT,
            DEFAULT_MATERIAL_UNITS_PER_BIT,
        );
        needs_rewrite = needs_rewrite || !valid;

        let (recovery_modifier, valid) = parse_modifier_key(obj);
        needs_rewrite = needs_rewrite || !valid;

        let (disallowed_recipes, valid) = parse_disallowed_recipes(obj);
        needs_rewrite = needs_rewrite || !valid;

        (
            Self {
                voxels_per_ingot,
                voxels_per_plate,
                material_units_per_ingot,
                material_units_per_bit,
                recovery_modifier,
                disallowed_recipes,
            },
            needs_rewrite,
        )
    }

    /// 序列化为宿主回写用的 JSON 值
    ///
    /// 禁用配方列表按字典序输出，保证回写内容可复现。
    pub fn to_json(&self) -> Value {
        let mut recipes: Vec<&String> = self.disallowed_recipes.iter().collect();
        recipes.sort();

        let mut map = serde_json::Map::new();
        map.insert(
            config_keys::VOXELS_PER_INGOT.to_string(),
            Value::from(self.voxels_per_ingot),
        );
        map.insert(
            config_keys::VOXELS_PER_PLATE.to_string(),
            Value::from(self.voxels_per_plate),
        );
        map.insert(
            config_keys::MATERIAL_UNITS_PER_INGOT.to_string(),
            Value::from(self.material_units_per_ingot),
        );
        map.insert(
            config_keys::MATERIAL_UNITS_PER_BIT.to_string(),
            Value::from(self.material_units_per_bit),
        );
        map.insert(
            config_keys::RECOVERY_MODIFIER.to_string(),
            Value::from(self.recovery_modifier),
        );
        map.insert(
            config_keys::DISALLOWED_RECIPES.to_string(),
            Value::Array(recipes.into_iter().map(|r| Value::from(r.as_str())).collect()),
        );

        Value::Object(map)
    }

    /// 指定配方产出是否被禁用回收
    ///
    /// # 参数
    /// - output_identity: 配方产出标识的字符串形式（"domain:path"）
    pub fn is_recipe_disallowed(&self, output_identity: &str) -> bool {
        self.disallowed_recipes.contains(output_identity)
    }

    /// 修复直接构造时可能出现的非法取值
    ///
    /// 零分母会污染全部下游除法，修复为默认值；解析路径产出的
    /// 配置已在区间内，此方法面向宿主手工构造的配置。
    pub fn sanitized(mut self) -> Self {
        if self.voxels_per_ingot == 0 {
            tracing::warn!(
                config_key = config_keys::VOXELS_PER_INGOT,
                "配置值为 0 将导致除零，修复为默认值 {}",
                DEFAULT_VOXELS_PER_INGOT
            );
            self.voxels_per_ingot = DEFAULT_VOXELS_PER_INGOT;
        }

        if self.material_units_per_bit == 0 {
            tracing::warn!(
                config_key = config_keys::MATERIAL_UNITS_PER_BIT,
                "配置值为 0 将导致除零，修复为默认值 {}",
                DEFAULT_MATERIAL_UNITS_PER_BIT
            );
            self.material_units_per_bit = DEFAULT_MATERIAL_UNITS_PER_BIT;
        }

        if !self.recovery_modifier.is_finite()
            || self.recovery_modifier < RECOVERY_MODIFIER_RANGE.0
            || self.recovery_modifier > RECOVERY_MODIFIER_RANGE.1
        {
            tracing::warn!(
                config_key = config_keys::RECOVERY_MODIFIER,
                raw_value = self.recovery_modifier,
                "回收效率系数非法，修复为默认值 {}",
                DEFAULT_RECOVERY_MODIFIER
            );
            self.recovery_modifier = DEFAULT_RECOVERY_MODIFIER;
        }

        self
    }
}

// ==========================================
// 键级解析辅助
// ==========================================

/// 整数键的公共读取路径
///
/// # 返回
/// - i64: 可用的整数值（可能是默认值）
/// - bool: 是否使用了默认值或发生了截断（任一情形都要求回写）
fn try_int_key(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    default: i64,
) -> (i64, bool) {
    let Some(value) = obj.get(key) else {
        tracing::info!(config_key = key, "配置缺少该键，使用默认值 {}", default);
        return (default, true);
    };

    if let Some(v) = value.as_i64() {
        return (v, false);
    }

    if let Some(f) = value.as_f64() {
        let truncated = f.trunc() as i64;
        tracing::warn!(
            config_key = key,
            raw_value = f,
            "配置值为浮点数，截断为 {}",
            truncated
        );
        return (truncated, true);
    }

    tracing::warn!(
        config_key = key,
        raw_value = %value,
        "配置值不是整数，使用默认值 {}",
        default
    );
    (default, true)
}

/// 解析 [1, 255] 区间的字节键
fn parse_byte_key(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    default: u8,
) -> (u8, bool) {
    let (value, used_default) = try_int_key(obj, key, default as i64);

    if !(1..=255).contains(&value) {
        tracing::warn!(
            config_key = key,
            raw_value = value,
            "配置值超出 [1, 255] 区间，使用默认值 {}",
            default
        );
        return (default, false);
    }

    (value as u8, !used_default)
}

/// 解析 [1, 65535] 区间的短整键
fn parse_ushort_key(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    default: u16,
) -> (u16, bool) {
    let (value, used_default) = try_int_key(obj, key, default as i64);

    if !(1..=65535).contains(&value) {
        tracing::warn!(
            config_key = key,
            raw_value = value,
            "配置值超出 [1, 65535] 区间，使用默认值 {}",
            default
        );
        return (default, false);
    }

    (value as u16, !used_default)
}

/// 解析回收效率系数
fn parse_modifier_key(obj: &serde_json::Map<String, Value>) -> (f64, bool) {
    let key = config_keys::RECOVERY_MODIFIER;

    let Some(value) = obj.get(key) else {
        tracing::info!(
            config_key = key,
            "配置缺少该键，使用默认值 {}",
            DEFAULT_RECOVERY_MODIFIER
        );
        return (DEFAULT_RECOVERY_MODIFIER, false);
    };

    let Some(v) = value.as_f64() else {
        tracing::warn!(
            config_key = key,
            raw_value = %value,
            "配置值不是数字，使用默认值 {}",
            DEFAULT_RECOVERY_MODIFIER
        );
        return (DEFAULT_RECOVERY_MODIFIER, false);
    };

    if !v.is_finite() || v < RECOVERY_MODIFIER_RANGE.0 || v > RECOVERY_MODIFIER_RANGE.1 {
        tracing::warn!(
            config_key = key,
            raw_value = v,
            "配置值超出 [{}, {}] 区间，使用默认值 {}",
            RECOVERY_MODIFIER_RANGE.0,
            RECOVERY_MODIFIER_RANGE.1,
            DEFAULT_RECOVERY_MODIFIER
        );
        return (DEFAULT_RECOVERY_MODIFIER, false);
    }

    (v, true)
}

/// 解析禁用配方列表
///
/// 非字符串元素逐个跳过并告警，不影响其余元素。
fn parse_disallowed_recipes(obj: &serde_json::Map<String, Value>) -> (HashSet<String>, bool) {
    let key = config_keys::DISALLOWED_RECIPES;

    let Some(value) = obj.get(key) else {
        tracing::info!(config_key = key, "配置缺少该键，使用空列表");
        return (HashSet::new(), false);
    };

    let Some(items) = value.as_array() else {
        tracing::warn!(config_key = key, "配置值不是数组，使用空列表");
        return (HashSet::new(), false);
    };

    let mut recipes = HashSet::with_capacity(items.len());
    let mut valid = true;

    for item in items {
        match item.as_str() {
            Some(s) => {
                recipes.insert(s.to_string());
            }
            None => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %item,
                    "列表包含非字符串元素，忽略该元素"
                );
                valid = false;
            }
        }
    }

    (recipes, valid)
}

// ==========================================
// 配置键名
// ==========================================
pub mod config_keys {
    pub const VOXELS_PER_INGOT: &str = "voxelsPerIngot";
    pub const VOXELS_PER_PLATE: &str = "voxelsPerPlate";
    pub const MATERIAL_UNITS_PER_INGOT: &str = "materialUnitsPerIngot";
    pub const MATERIAL_UNITS_PER_BIT: &str = "materialUnitsPerBit";
    pub const RECOVERY_MODIFIER: &str = "recoveryModifier";
    pub const DISALLOWED_RECIPES: &str = "disallowedRecipes";
}
