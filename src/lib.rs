// ==========================================
// 锻造废料回收系统 - 核心库
// ==========================================
// 系统定位: 宿主内嵌的回收核算核心 (宿主保留最终事件控制权)
// 技术栈: Rust + serde + tracing
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 会话/台账/配方类型
pub mod domain;

// 工件属性存储层 - 宿主键值存储抽象
pub mod repository;

// 引擎层 - 核算与生命周期
pub mod engine;

// 配置层 - 回收参数
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    bit_code, make_path, HeatState, ItemCode, MaterialKind, StackSnapshot, WorkPos,
};

// 领域实体
pub use domain::{
    ExtensionLedger, ExtensionModifier, ModifierField, ModifierTotals, ModifierViolation,
    RawModifierRecord, SessionCodecError, SmithingRecipe, WorkSession,
};

// 引擎
pub use engine::{
    IssueRequest, LifecycleOutcome, NoOpUnitSink, RecipeVoxelIndex, RecoveryEngine,
    SalvageEstimate, SessionLifecycle, UnitSink,
};

// 配置
pub use config::salvage_config::SalvageConfig;

// 存储
pub use repository::{
    MemoryAttributeStore, StoreError, StoreResult, WorkItemStore, EXTENSION_PREFIX, SESSION_KEY,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "锻造废料回收系统";

// ==========================================
// 预编译检查
// ==========================================
