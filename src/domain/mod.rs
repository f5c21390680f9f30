// ==========================================
// 锻造废料回收系统 - 领域模型层
// ==========================================
// 职责: 定义核算实体、物品标识与校验规则
// 红线: 不含存储访问逻辑,不含引擎计算逻辑
// ==========================================

pub mod modifier;
pub mod recipe;
pub mod types;
pub mod work_session;

// 重导出核心类型
pub use modifier::{
    ExtensionLedger, ExtensionModifier, ModifierField, ModifierTotals, ModifierViolation,
    RawModifierRecord,
};
pub use recipe::SmithingRecipe;
pub use types::{
    bit_code, make_path, HeatState, ItemCode, MaterialKind, StackSnapshot, WorkPos, BIT_PREFIX,
    INGOT_PREFIX, PLATE_PREFIX,
};
pub use work_session::{SessionCodecError, WorkSession, SESSION_RECORD_LEN};
