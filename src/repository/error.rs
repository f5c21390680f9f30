// ==========================================
// 锻造废料回收系统 - 存储能力层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::work_session::SessionCodecError;
use thiserror::Error;

/// 存储能力层错误类型
///
/// 仅宿主属性存储的真实故障通过 Result 传播；可恢复情形
/// （单条扩展记录损坏等）在读取处降级跳过，不进入此类型。
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== 记录损坏 =====
    #[error("工作会话记录损坏: {0}")]
    CorruptSession(#[from] SessionCodecError),

    #[error("属性值类型不符 (key={key}): {message}")]
    AttributeTypeMismatch { key: String, message: String },

    // ===== 宿主存储故障 =====
    #[error("属性存储访问失败 (key={key}): {message}")]
    AccessFailure { key: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
