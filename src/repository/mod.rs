// ==========================================
// 锻造废料回收系统 - 存储能力层
// ==========================================
// 红线: 存储能力不含核算逻辑
// ==========================================
// 职责: 以能力接口屏蔽宿主属性存储细节；
// 持久化机制（网络同步、落盘）归宿主所有
// ==========================================

pub mod attribute_store;
pub mod error;

// 重导出核心能力
pub use attribute_store::{
    MemoryAttributeStore, WorkItemStore, EXTENSION_PREFIX, SESSION_KEY,
};
pub use error::{StoreError, StoreResult};
