// ==========================================
// 锻造废料回收系统 - 领域类型定义
// ==========================================
// 物品标识、原料类型、工位坐标等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 物品标识前缀约定
// ==========================================
// 宿主游戏物品 path 以 '-' 分段，首段标识物品形态
pub const INGOT_PREFIX: &str = "ingot";
pub const PLATE_PREFIX: &str = "metalplate";
pub const BIT_PREFIX: &str = "metalbit";

// ==========================================
// 物品标识 (Item Code)
// ==========================================
// 形如 "domain:path" 的两段式标识
// 例: "game:ingot-copper" / "game:metalbit-copper"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemCode {
    pub domain: String, // 命名空间（通常为 "game" 或来源扩展名）
    pub path: String,   // '-' 分段的物品路径
}

impl ItemCode {
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// path 的第一段（无 '-' 时为整个 path）
    pub fn first_segment(&self) -> &str {
        match self.path.find('-') {
            Some(idx) => &self.path[..idx],
            None => &self.path,
        }
    }

    /// path 的最后一段（无 '-' 时为整个 path）
    pub fn last_segment(&self) -> &str {
        match self.path.rfind('-') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }
}

impl fmt::Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.path)
    }
}

/// 以 '-' 连接 path 分段
pub fn make_path(parts: &[&str]) -> String {
    parts.join("-")
}

/// 回收单位（碎料）的物品标识
///
/// 由配方原料标识推导: 保留 domain，将 path 首段替换为固定前缀
/// "metalbit"，其余取原料 path 的最后一段。
///
/// # 示例
/// "game:ingot-copper" → "game:metalbit-copper"
pub fn bit_code(ingredient: &ItemCode) -> ItemCode {
    ItemCode::new(
        ingredient.domain.clone(),
        make_path(&[BIT_PREFIX, ingredient.last_segment()]),
    )
}

// ==========================================
// 原料类型 (Material Kind)
// ==========================================
// 按物品 path 首段识别，仅锭/板参与回收核算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialKind {
    Ingot,      // 锭
    Plate,      // 板
    Irrelevant, // 与核算无关的物品
}

impl MaterialKind {
    /// 按 path 首段识别物品的原料类型
    pub fn classify(code: &ItemCode) -> Self {
        match code.first_segment() {
            s if s == INGOT_PREFIX => MaterialKind::Ingot,
            s if s == PLATE_PREFIX => MaterialKind::Plate,
            _ => MaterialKind::Irrelevant,
        }
    }

    pub fn is_relevant(self) -> bool {
        !matches!(self, MaterialKind::Irrelevant)
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialKind::Ingot => write!(f, "INGOT"),
            MaterialKind::Plate => write!(f, "PLATE"),
            MaterialKind::Irrelevant => write!(f, "IRRELEVANT"),
        }
    }
}

// ==========================================
// 库存快照 (Stack Snapshot)
// ==========================================
// 放料事件的前后观测值，用于计算实际消耗量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSnapshot {
    pub code: ItemCode, // 手持物品标识
    pub size: u32,      // 堆叠数量
}

impl StackSnapshot {
    pub fn new(code: ItemCode, size: u32) -> Self {
        Self { code, size }
    }
}

// ==========================================
// 工位坐标 (Work Position)
// ==========================================
// 工件所在的世界坐标，中止回收时在此处抛出碎料
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorkPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for WorkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ==========================================
// 受热状态 (Heat State)
// ==========================================
// 发放碎料时从工件继承的温度属性，缺失表示常温发放
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatState {
    pub temperature: f64,       // 当前温度
    pub last_update_hours: f64, // 宿主日历小时（透传，不在本核心内换算）
}
