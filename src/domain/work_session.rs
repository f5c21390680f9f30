// ==========================================
// 锻造废料回收系统 - 工作会话
// ==========================================
// 单个工件的原料投入计数及其持久化编码
// ==========================================
// 编码约定: 恰好 2 字节，依次为锭数、板数，无头无长度前缀；
// 宿主会跨网络边界复制该记录，必须逐字节往返一致
// ==========================================

use crate::domain::types::MaterialKind;
use thiserror::Error;

/// 持久化编码的固定长度（字节）
pub const SESSION_RECORD_LEN: usize = 2;

// ==========================================
// 编码错误
// ==========================================
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionCodecError {
    #[error("工作会话记录长度必须为 {SESSION_RECORD_LEN} 字节, 实际 {actual} 字节")]
    InvalidLength { actual: usize },
}

// ==========================================
// 工作会话 (Work Session)
// ==========================================
// 计数器饱和累加，到 255 封顶，不回绕
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkSession {
    ingot_count: u8, // 已投入的锭数
    plate_count: u8, // 已投入的板数
}

impl WorkSession {
    /// 创建零计数会话
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(ingot_count: u8, plate_count: u8) -> Self {
        Self {
            ingot_count,
            plate_count,
        }
    }

    pub fn ingot_count(&self) -> u8 {
        self.ingot_count
    }

    pub fn plate_count(&self) -> u8 {
        self.plate_count
    }

    /// 是否已有任何原料投入
    pub fn has_inputs(&self) -> bool {
        self.ingot_count > 0 || self.plate_count > 0
    }

    /// 累加一次原料投入
    ///
    /// # 参数
    /// - kind: 原料类型，Irrelevant 不产生任何变更
    /// - amount: 本次投入量，调用方须预先按库存实际减少量裁剪
    pub fn record(&mut self, kind: MaterialKind, amount: u8) {
        match kind {
            MaterialKind::Ingot => self.ingot_count = self.ingot_count.saturating_add(amount),
            MaterialKind::Plate => self.plate_count = self.plate_count.saturating_add(amount),
            MaterialKind::Irrelevant => {}
        }
    }

    /// 编码为持久化形式
    pub fn to_bytes(&self) -> [u8; SESSION_RECORD_LEN] {
        [self.ingot_count, self.plate_count]
    }

    /// 从持久化形式解码
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionCodecError> {
        if bytes.len() != SESSION_RECORD_LEN {
            return Err(SessionCodecError::InvalidLength {
                actual: bytes.len(),
            });
        }

        Ok(Self {
            ingot_count: bytes[0],
            plate_count: bytes[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        // 场景: 分两次投入 2 + 3 锭，与一次投入 5 锭结果一致
        let mut split = WorkSession::new();
        split.record(MaterialKind::Ingot, 2);
        split.record(MaterialKind::Ingot, 3);

        let mut whole = WorkSession::new();
        whole.record(MaterialKind::Ingot, 5);

        assert_eq!(split, whole);
        assert_eq!(split.ingot_count(), 5);
        assert_eq!(split.plate_count(), 0);
    }

    #[test]
    fn test_record_saturates_at_255() {
        let mut session = WorkSession::with_counts(250, 0);
        session.record(MaterialKind::Ingot, 10);
        assert_eq!(session.ingot_count(), 255); // 饱和，不回绕

        session.record(MaterialKind::Ingot, 1);
        assert_eq!(session.ingot_count(), 255);
    }

    #[test]
    fn test_record_ignores_irrelevant() {
        let mut session = WorkSession::new();
        session.record(MaterialKind::Irrelevant, 7);
        assert!(!session.has_inputs());
    }

    #[test]
    fn test_has_inputs() {
        assert!(!WorkSession::new().has_inputs());
        assert!(WorkSession::with_counts(1, 0).has_inputs());
        assert!(WorkSession::with_counts(0, 1).has_inputs());
        assert!(WorkSession::with_counts(255, 255).has_inputs());
    }

    #[test]
    fn test_byte_roundtrip_order() {
        // 编码顺序: 先锭后板
        let session = WorkSession::with_counts(7, 3);
        let bytes = session.to_bytes();
        assert_eq!(bytes, [7, 3]);

        let decoded = WorkSession::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_byte_roundtrip_full_range() {
        // 每个字段独立遍历 0-255 全部取值
        for v in 0..=255u8 {
            let by_ingot = WorkSession::with_counts(v, 0);
            assert_eq!(
                WorkSession::from_bytes(&by_ingot.to_bytes()).unwrap(),
                by_ingot
            );

            let by_plate = WorkSession::with_counts(0, v);
            assert_eq!(
                WorkSession::from_bytes(&by_plate.to_bytes()).unwrap(),
                by_plate
            );
        }
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            WorkSession::from_bytes(&[1]),
            Err(SessionCodecError::InvalidLength { actual: 1 })
        );
        assert_eq!(
            WorkSession::from_bytes(&[1, 2, 3]),
            Err(SessionCodecError::InvalidLength { actual: 3 })
        );
        assert_eq!(
            WorkSession::from_bytes(&[]),
            Err(SessionCodecError::InvalidLength { actual: 0 })
        );
    }
}
