// ==========================================
// 锻造废料回收系统 - 单元发放
// ==========================================
// 职责: 定义可回收单元发放 trait，实现依赖倒置
// 说明: 核心层定义 trait，宿主适配器负责实际生成物品
// 优势: 核算与生命周期不依赖宿主的物品/实体系统
// ==========================================

use crate::domain::types::{HeatState, ItemCode, WorkPos};
use std::error::Error;

// ==========================================
// 发放请求
// ==========================================

/// 可回收单元发放请求
///
/// 核心层产出的发放意图，宿主适配器据此生成物品堆。
/// 携带可选热态，热工件中止时碎料继承工件温度。
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRequest {
    /// 单元物品标识
    pub code: ItemCode,
    /// 发放数量
    pub count: u32,
    /// 继承的热态（冷工件为 None）
    pub heat: Option<HeatState>,
}

impl IssueRequest {
    /// 创建冷态发放请求
    pub fn new(code: ItemCode, count: u32) -> Self {
        Self {
            code,
            count,
            heat: None,
        }
    }

    /// 创建继承热态的发放请求
    pub fn heated(code: ItemCode, count: u32, heat: HeatState) -> Self {
        Self {
            code,
            count,
            heat: Some(heat),
        }
    }
}

// ==========================================
// 单元发放 Trait
// ==========================================

/// 单元发放者 Trait
///
/// 核心层定义，宿主适配器实现
///
/// # 实现说明
/// - `spawn_at` 在世界坐标直接生成物品堆
/// - `try_give` 尝试塞入玩家背包，返回背包是否接收
pub trait UnitSink: Send + Sync {
    /// 在世界坐标生成单元堆
    fn spawn_at(&self, request: &IssueRequest, pos: WorkPos) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// 尝试将单元塞入玩家背包
    ///
    /// # 返回
    /// - `Ok(true)`: 背包已接收
    /// - `Ok(false)`: 背包未接收，调用方应落地生成
    fn try_give(&self, request: &IssueRequest, player_id: &str) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

/// 发放单元到世界坐标
///
/// 数量不足 1 时为空操作，不触达宿主。
pub fn issue_units<S: UnitSink + ?Sized>(
    sink: &S,
    request: &IssueRequest,
    pos: WorkPos,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if request.count < 1 {
        tracing::debug!(code = %request.code, "发放数量不足 1，跳过");
        return Ok(());
    }
    sink.spawn_at(request, pos)
}

/// 发放单元给玩家，背包不接收时落在世界坐标
pub fn issue_units_to_player<S: UnitSink + ?Sized>(
    sink: &S,
    request: &IssueRequest,
    player_id: &str,
    pos: WorkPos,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if request.count < 1 {
        tracing::debug!(code = %request.code, player_id, "发放数量不足 1，跳过");
        return Ok(());
    }
    if sink.try_give(request, player_id)? {
        return Ok(());
    }
    sink.spawn_at(request, pos)
}

/// 空操作发放者
///
/// 用于不需要实际发放的场景（如单元测试、纯核算）
#[derive(Debug, Clone, Default)]
pub struct NoOpUnitSink;

impl UnitSink for NoOpUnitSink {
    fn spawn_at(&self, request: &IssueRequest, pos: WorkPos) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpUnitSink: 跳过落地发放 - code={}, count={}, pos=({},{},{})",
            request.code,
            request.count,
            pos.x,
            pos.y,
            pos.z
        );
        Ok(())
    }

    fn try_give(&self, request: &IssueRequest, player_id: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpUnitSink: 跳过背包发放 - code={}, count={}, player={}",
            request.code,
            request.count,
            player_id
        );
        Ok(true)
    }
}
