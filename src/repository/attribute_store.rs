// ==========================================
// 锻造废料回收系统 - 工件属性存储能力
// ==========================================
// 职责: 定义工件级键值属性的访问接口（不包含核算逻辑）
// 红线: 存储能力只做记录存取，回收规则一律归引擎层
// ==========================================
// 键约定:
// - 工作会话记录存于 "salvage:session"（2 字节原始记录）
// - 扩展贡献存于 "salvage:ext:" + 贡献方名，三字段记录
//   宿主无需预知贡献方即可按前缀枚举全部条目
// ==========================================

use crate::domain::modifier::RawModifierRecord;
use crate::domain::types::HeatState;
use crate::domain::work_session::WorkSession;
use crate::repository::error::{StoreError, StoreResult};
use std::collections::HashMap;

/// 工作会话记录的存储键
pub const SESSION_KEY: &str = "salvage:session";

/// 扩展贡献条目的键前缀
pub const EXTENSION_PREFIX: &str = "salvage:ext:";

// ==========================================
// WorkItemStore Trait
// ==========================================
// 用途: 单个工件的持久化属性访问
// 实现者: 宿主适配器；测试使用 MemoryAttributeStore
// 所有权: 每个存储实例归其工件独占，同一 tick 内单线程访问
pub trait WorkItemStore {
    // ===== 工作会话记录 =====

    /// 读取工作会话
    ///
    /// # 返回
    /// - Ok(Some(session)): 记录存在且可解码
    /// - Ok(None): 记录不存在
    /// - Err: 记录损坏或存储访问失败
    fn session(&self) -> StoreResult<Option<WorkSession>>;

    /// 写入工作会话（覆盖既有记录）
    fn put_session(&mut self, session: &WorkSession) -> StoreResult<()>;

    /// 删除工作会话
    ///
    /// 记录不存在时为无害空操作，不得报错。
    fn remove_session(&mut self) -> StoreResult<()>;

    // ===== 扩展贡献条目 =====

    /// 枚举全部扩展贡献条目
    ///
    /// 返回 (贡献方名, 原始记录)，名称已剥离键前缀。
    /// 无法解析为三字段记录的条目由实现跳过并记 warn 日志，
    /// 不中断枚举。
    fn extension_entries(&self) -> StoreResult<Vec<(String, RawModifierRecord)>>;

    /// 写入一条扩展贡献（第三方写入口，覆盖同名条目）
    fn put_extension(&mut self, name: &str, record: &RawModifierRecord) -> StoreResult<()>;

    /// 清除全部扩展贡献条目
    ///
    /// 无条目时为无害空操作，不得报错。
    fn clear_extensions(&mut self) -> StoreResult<()>;

    // ===== 工件温度 =====

    /// 工件当前受热状态，缺失表示常温
    fn heat_state(&self) -> Option<HeatState>;
}

// ==========================================
// 内存属性存储 (Memory Attribute Store)
// ==========================================
// 以 serde_json::Value 模拟宿主的动态属性袋；
// 测试与无持久化宿主场景使用
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    attributes: HashMap<String, serde_json::Value>,
    heat: Option<HeatState>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入原始属性值（测试用，可构造畸形条目）
    pub fn insert_raw(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn set_heat_state(&mut self, heat: Option<HeatState>) {
        self.heat = heat;
    }
}

impl WorkItemStore for MemoryAttributeStore {
    fn session(&self) -> StoreResult<Option<WorkSession>> {
        let Some(value) = self.attributes.get(SESSION_KEY) else {
            return Ok(None);
        };

        let Some(items) = value.as_array() else {
            return Err(StoreError::AttributeTypeMismatch {
                key: SESSION_KEY.to_string(),
                message: "期望字节数组".to_string(),
            });
        };

        let mut bytes = Vec::with_capacity(items.len());
        for item in items {
            match item.as_u64() {
                Some(b) if b <= u8::MAX as u64 => bytes.push(b as u8),
                _ => {
                    return Err(StoreError::AttributeTypeMismatch {
                        key: SESSION_KEY.to_string(),
                        message: format!("数组元素不是字节: {}", item),
                    });
                }
            }
        }

        let session = WorkSession::from_bytes(&bytes)?;
        Ok(Some(session))
    }

    fn put_session(&mut self, session: &WorkSession) -> StoreResult<()> {
        let bytes = session.to_bytes();
        let value = serde_json::Value::Array(
            bytes
                .iter()
                .map(|b| serde_json::Value::from(*b as u64))
                .collect(),
        );
        self.attributes.insert(SESSION_KEY.to_string(), value);
        Ok(())
    }

    fn remove_session(&mut self) -> StoreResult<()> {
        self.attributes.remove(SESSION_KEY);
        Ok(())
    }

    fn extension_entries(&self) -> StoreResult<Vec<(String, RawModifierRecord)>> {
        let mut entries = Vec::new();

        for (key, value) in &self.attributes {
            let Some(name) = key.strip_prefix(EXTENSION_PREFIX) else {
                continue;
            };

            match serde_json::from_value::<RawModifierRecord>(value.clone()) {
                Ok(record) => entries.push((name.to_string(), record)),
                Err(err) => {
                    // 整条畸形条目跳过，不影响其余条目
                    tracing::warn!(
                        key = key.as_str(),
                        error = %err,
                        "扩展贡献条目不是合法的三字段记录，跳过"
                    );
                }
            }
        }

        // HashMap 迭代顺序不稳定，按名称排序保证枚举结果可复现
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn put_extension(&mut self, name: &str, record: &RawModifierRecord) -> StoreResult<()> {
        let value = serde_json::to_value(record).map_err(anyhow::Error::new)?;
        self.attributes
            .insert(format!("{}{}", EXTENSION_PREFIX, name), value);
        Ok(())
    }

    fn clear_extensions(&mut self) -> StoreResult<()> {
        self.attributes
            .retain(|key, _| !key.starts_with(EXTENSION_PREFIX));
        Ok(())
    }

    fn heat_state(&self) -> Option<HeatState> {
        self.heat
    }
}
