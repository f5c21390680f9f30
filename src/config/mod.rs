// ==========================================
// 锻造废料回收系统 - 配置层
// ==========================================
// 职责: 回收参数的解析、校验与回写支持
// 存储: 配置文件 I/O 归宿主所有，本核心只处理 JSON 值
// ==========================================

pub mod salvage_config;

// 重导出核心配置类型
pub use salvage_config::{
    config_keys, SalvageConfig, DEFAULT_MATERIAL_UNITS_PER_BIT, DEFAULT_MATERIAL_UNITS_PER_INGOT,
    DEFAULT_RECOVERY_MODIFIER, DEFAULT_VOXELS_PER_INGOT, DEFAULT_VOXELS_PER_PLATE,
};
