// ==========================================
// 锻造废料回收系统 - 引擎层
// ==========================================
// 职责: 回收核算、预估与生命周期编排
// 红线: 引擎层不触碰宿主存储细节，只经 trait 访问
// ==========================================

pub mod estimate;
pub mod issuance;
pub mod lifecycle;
pub mod recipe_index;
pub mod recovery;

// 重导出核心引擎
pub use estimate::SalvageEstimate;
pub use issuance::{issue_units, issue_units_to_player, IssueRequest, NoOpUnitSink, UnitSink};
pub use lifecycle::{LifecycleOutcome, SessionLifecycle};
pub use recipe_index::RecipeVoxelIndex;
pub use recovery::RecoveryEngine;
