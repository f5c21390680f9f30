// ==========================================
// 锻造废料回收系统 - 会话生命周期
// ==========================================
// 职责: 工件事件驱动的状态机编排
// 状态: 无会话 → 累计中 → (完成|中止) → 无会话
// 红线: 任何错误路径不得中断宿主游戏流程，
// 一律降级为"跳过该笔贡献"或"回收 0 单元"
// ==========================================

use crate::config::salvage_config::SalvageConfig;
use crate::domain::modifier::ExtensionLedger;
use crate::domain::recipe::SmithingRecipe;
use crate::domain::types::{bit_code, MaterialKind, StackSnapshot, WorkPos};
use crate::domain::work_session::WorkSession;
use crate::engine::estimate::SalvageEstimate;
use crate::engine::issuance::{issue_units, issue_units_to_player, IssueRequest, UnitSink};
use crate::engine::recipe_index::RecipeVoxelIndex;
use crate::engine::recovery::RecoveryEngine;
use crate::repository::attribute_store::WorkItemStore;
use crate::repository::error::StoreResult;
use std::sync::Arc;

// ==========================================
// 状态迁移结果
// ==========================================

/// 单次事件处理后的状态迁移结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// 非事件或迁移条件不满足，状态未变
    NoChange,
    /// 放料已计入会话
    Recorded { kind: MaterialKind, amount: u8 },
    /// 预检补建了空会话
    SessionEnsured,
    /// 工件中止，全量投料折返
    Aborted { bits_issued: u32 },
    /// 工件完成，废料折返
    Completed { bits_issued: u32 },
}

// ==========================================
// 会话生命周期 (Session Lifecycle)
// ==========================================

/// 工件会话生命周期编排器
///
/// 生命周期等同一个已加载的世界会话，由宿主在世界装载时
/// 构造并注入配方索引与发放适配器。单个工件的全部事件在
/// 同一逻辑线程内串行到达，编排器自身不做跨工件互斥。
pub struct SessionLifecycle {
    engine: RecoveryEngine,
    index: Arc<RecipeVoxelIndex>,
    sink: Arc<dyn UnitSink>,
}

impl SessionLifecycle {
    pub fn new(config: SalvageConfig, index: Arc<RecipeVoxelIndex>, sink: Arc<dyn UnitSink>) -> Self {
        Self {
            engine: RecoveryEngine::new(config),
            index,
            sink,
        }
    }

    pub fn engine(&self) -> &RecoveryEngine {
        &self.engine
    }

    pub fn index(&self) -> &RecipeVoxelIndex {
        &self.index
    }

    /// 放料事件: 按料堆前后观测差累计会话计数
    ///
    /// # 参数
    /// - `pre`: 放料前的料堆观测值
    /// - `post`: 放料后的料堆观测值，料堆耗尽时为 None
    ///
    /// # 说明
    /// 仅锭/板两类材料参与累计，其余物品不产生状态变化。
    /// 前后物品标识不一致视为多物品歧义，按非事件处理。
    pub fn on_material_placed(
        &self,
        store: &mut dyn WorkItemStore,
        pre: &StackSnapshot,
        post: Option<&StackSnapshot>,
    ) -> StoreResult<LifecycleOutcome> {
        let kind = MaterialKind::classify(&pre.code);
        if !kind.is_relevant() {
            return Ok(LifecycleOutcome::NoChange);
        }

        let consumed = match post {
            Some(post) => {
                if post.code != pre.code {
                    tracing::debug!(
                        pre_code = %pre.code,
                        post_code = %post.code,
                        "放料前后物品标识不一致，按非事件处理"
                    );
                    return Ok(LifecycleOutcome::NoChange);
                }
                pre.size.saturating_sub(post.size)
            }
            None => pre.size,
        };
        if consumed == 0 {
            tracing::debug!(code = %pre.code, "料堆数量未减少，按非事件处理");
            return Ok(LifecycleOutcome::NoChange);
        }

        // 单次观测差上限即单字节计数上限
        let amount = consumed.min(u32::from(u8::MAX)) as u8;

        let mut session = store.session()?.unwrap_or_default();
        session.record(kind, amount);
        store.put_session(&session)?;

        tracing::debug!(
            kind = %kind,
            amount,
            ingots = session.ingot_count(),
            plates = session.plate_count(),
            "放料入账"
        );
        Ok(LifecycleOutcome::Recorded { kind, amount })
    }

    /// 移除体素前的预检: 为纯体素路径补建空会话
    ///
    /// 未放过料的工件若直接被移除可回收体素，中止时也要有
    /// 会话可结算，这里补建零计数会话。
    pub fn on_voxel_removing(
        &self,
        store: &mut dyn WorkItemStore,
        recipe: &SmithingRecipe,
        removed_is_recoverable: bool,
    ) -> StoreResult<LifecycleOutcome> {
        if !removed_is_recoverable || !self.engine.recipe_is_allowed(recipe) {
            return Ok(LifecycleOutcome::NoChange);
        }
        if store.session()?.is_some() {
            return Ok(LifecycleOutcome::NoChange);
        }

        store.put_session(&WorkSession::new())?;
        tracing::debug!("预检补建空会话");
        Ok(LifecycleOutcome::SessionEnsured)
    }

    /// 移除体素后的中止判定
    ///
    /// 网格内不再有可回收体素且配方允许时触发中止: 合并会话
    /// 计数与扩展净值折算全量投料，在工件坐标落地发放（中止
    /// 时无在场玩家，不走背包），随后销毁会话与台账。
    ///
    /// # 边界
    /// 会话与台账均无任何投入时为空操作，不销毁不发放。
    pub fn on_voxel_removed(
        &self,
        store: &mut dyn WorkItemStore,
        recipe: &SmithingRecipe,
        recoverable_remaining: bool,
        pos: WorkPos,
    ) -> StoreResult<LifecycleOutcome> {
        if recoverable_remaining || !self.engine.recipe_is_allowed(recipe) {
            return Ok(LifecycleOutcome::NoChange);
        }

        let session = store.session()?;
        let ledger = self.read_ledger(store)?;
        let has_session_input = session.map_or(false, |s| s.has_inputs());
        if !has_session_input && ledger.is_empty() {
            return Ok(LifecycleOutcome::NoChange);
        }

        let session = session.unwrap_or_default();
        let totals = ledger.aggregate();
        let bits = self.engine.total_input_bits(&session, &totals);

        self.issue(store, recipe, bits, None, pos)?;

        store.remove_session()?;
        store.clear_extensions()?;

        tracing::info!(
            bits_issued = bits,
            ingots = session.ingot_count(),
            plates = session.plate_count(),
            "工件中止，全量投料折返"
        );
        Ok(LifecycleOutcome::Aborted { bits_issued: bits })
    }

    /// 完成检查: 网格与配方目标一致且配方允许时结算废料
    ///
    /// # 参数
    /// - `grid_matches`: 宿主对当前网格与配方目标网格的比对结果
    /// - `player_id`: 在场玩家，优先塞背包，背包不接收时落地
    ///
    /// # 说明
    /// 会话缺失时为空操作。无论是否发放，结算后会话与台账
    /// 一并销毁，零废料是常见合法结果。
    pub fn on_completion_check(
        &self,
        store: &mut dyn WorkItemStore,
        recipe: &SmithingRecipe,
        grid_matches: bool,
        player_id: Option<&str>,
        pos: WorkPos,
    ) -> StoreResult<LifecycleOutcome> {
        if !grid_matches || !self.engine.recipe_is_allowed(recipe) {
            return Ok(LifecycleOutcome::NoChange);
        }

        let Some(session) = store.session()? else {
            return Ok(LifecycleOutcome::NoChange);
        };

        let ledger = self.read_ledger(store)?;
        let totals = ledger.aggregate();
        let required = self.index.required_voxels(recipe);
        let waste = self.engine.waste_voxels(&session, required, &totals);
        let bits = self.engine.waste_return_bits(waste);

        self.issue(store, recipe, bits, player_id, pos)?;

        store.remove_session()?;
        store.clear_extensions()?;

        tracing::info!(
            bits_issued = bits,
            waste_voxels = waste,
            required_voxels = required,
            "工件完成，废料折返"
        );
        Ok(LifecycleOutcome::Completed { bits_issued: bits })
    }

    /// 面向界面的完成路径回收预估，只读不写
    pub fn completion_estimate(
        &self,
        store: &dyn WorkItemStore,
        recipe: &SmithingRecipe,
    ) -> StoreResult<SalvageEstimate> {
        let session = store.session()?.unwrap_or_default();
        let totals = self.read_ledger(store)?.aggregate();
        let required = self.index.required_voxels(recipe);
        Ok(SalvageEstimate::for_completion(
            &self.engine,
            &session,
            required,
            &totals,
        ))
    }

    /// 读取扩展台账，字段级违规已在校验时记录
    fn read_ledger(&self, store: &dyn WorkItemStore) -> StoreResult<ExtensionLedger> {
        let entries = store.extension_entries()?;
        let (ledger, _violations) = ExtensionLedger::from_entries(&entries);
        Ok(ledger)
    }

    /// 按配方原料派生碎料标识并发放
    ///
    /// 原料标识缺失时按零回收降级，只告警不报错。
    fn issue(
        &self,
        store: &dyn WorkItemStore,
        recipe: &SmithingRecipe,
        bits: u32,
        player_id: Option<&str>,
        pos: WorkPos,
    ) -> StoreResult<()> {
        if bits < 1 {
            return Ok(());
        }
        let Some(ingredient) = recipe.ingredient() else {
            tracing::warn!("配方缺少原料标识，无法派生碎料标识，按零回收处理");
            return Ok(());
        };

        let code = bit_code(ingredient);
        let request = match store.heat_state() {
            Some(heat) => IssueRequest::heated(code, bits, heat),
            None => IssueRequest::new(code, bits),
        };

        let issued = match player_id {
            Some(player) => issue_units_to_player(self.sink.as_ref(), &request, player, pos),
            None => issue_units(self.sink.as_ref(), &request, pos),
        };
        issued.map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    }
}
