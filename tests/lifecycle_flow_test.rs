// ==========================================
// 会话生命周期集成测试
// ==========================================
// 测试范围:
// 1. 放料 → 累计 → 完成/中止的完整状态流
// 2. 扩展台账在终态结算中的聚合与清理
// 3. 禁用配方对全部迁移的拦截
// 4. 终态事件的幂等性与发放副作用
// ==========================================


use forming_salvage::engine::issuance::NoOpUnitSink;
use forming_salvage::{
    HeatState, ItemCode, LifecycleOutcome, MaterialKind, MemoryAttributeStore, RawModifierRecord,
    RecipeVoxelIndex, SalvageConfig, SessionLifecycle, StackSnapshot, WorkItemStore, WorkSession,
};
use std::sync::Arc;
use test_helpers::{anvil_pos, clean_config, copper_recipe, recipe, RecordingSink};

// ==========================================
// 测试辅助函数
// ==========================================

fn flow_with(config: SalvageConfig, sink: Arc<RecordingSink>) -> SessionLifecycle {
    SessionLifecycle::new(config, Arc::new(RecipeVoxelIndex::new()), sink)
}

fn ingot_snapshot(size: u32) -> StackSnapshot {
    StackSnapshot {
        code: ItemCode::new("game", "ingot-copper"),
        size,
    }
}

/// 模拟一次放下 count 个铜锭的事件
fn place_ingots(flow: &SessionLifecycle, store: &mut MemoryAttributeStore, count: u32) {
    let pre = ingot_snapshot(count + 1);
    let post = ingot_snapshot(1);
    flow.on_material_placed(store, &pre, Some(&post))
        .expect("放料事件处理失败");
}

// ==========================================
// 完成路径
// ==========================================

#[test]
fn test_completion_small_waste_floors_to_zero_bits() {
    // 默认配置: 42 体素/锭，100 质量/锭，5 质量/单元
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(SalvageConfig::default(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);

    // 废料 2 体素 ≈ 4.76 质量，取整后 0 单元
    let outcome = flow
        .on_completion_check(&mut store, &copper_recipe(40), true, Some("player-1"), anvil_pos())
        .expect("完成检查失败");
    assert_eq!(outcome, LifecycleOutcome::Completed { bits_issued: 0 });

    // 零发放也销毁会话
    assert!(store.session().expect("读取会话失败").is_none());
    assert_eq!(sink.give_count(), 0);
    assert_eq!(sink.spawn_count(), 0);
}

#[test]
fn test_completion_prefers_player_inventory() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);

    // 50 体素全部为废料 → 100 质量 → 20 单元
    let outcome = flow
        .on_completion_check(&mut store, &copper_recipe(0), true, Some("player-1"), anvil_pos())
        .expect("完成检查失败");
    assert_eq!(outcome, LifecycleOutcome::Completed { bits_issued: 20 });

    assert_eq!(sink.give_count(), 1);
    assert_eq!(sink.spawn_count(), 0);

    let given = sink.given.lock().unwrap();
    assert_eq!(given[0].0.count, 20);
    assert_eq!(given[0].0.code.to_string(), "game:metalbit-copper");
    assert_eq!(given[0].1, "player-1");
}

#[test]
fn test_completion_falls_back_to_drop_when_inventory_full() {
    let sink = Arc::new(RecordingSink::rejecting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);

    flow.on_completion_check(&mut store, &copper_recipe(0), true, Some("player-1"), anvil_pos())
        .expect("完成检查失败");

    assert_eq!(sink.give_count(), 1);
    assert_eq!(sink.spawn_count(), 1);
    let spawned = sink.spawned.lock().unwrap();
    assert_eq!(spawned[0].1, anvil_pos());
}

#[test]
fn test_completion_without_player_always_drops() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);

    flow.on_completion_check(&mut store, &copper_recipe(0), true, None, anvil_pos())
        .expect("完成检查失败");

    assert_eq!(sink.give_count(), 0);
    assert_eq!(sink.spawn_count(), 1);
}

// ==========================================
// 中止路径
// ==========================================

#[test]
fn test_abort_returns_full_input_as_bits() {
    // 默认配置下一锭中止: floor(100 / 5) = 20 单元
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(SalvageConfig::default(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);

    let outcome = flow
        .on_voxel_removed(&mut store, &copper_recipe(40), false, anvil_pos())
        .expect("中止判定失败");
    assert_eq!(outcome, LifecycleOutcome::Aborted { bits_issued: 20 });

    // 中止时无在场玩家，必须落地不走背包
    assert_eq!(sink.give_count(), 0);
    assert_eq!(sink.spawn_count(), 1);

    let spawned = sink.spawned.lock().unwrap();
    assert_eq!(spawned[0].0.count, 20);
    assert_eq!(spawned[0].0.code.to_string(), "game:metalbit-copper");
    assert_eq!(spawned[0].1, anvil_pos());

    assert!(store.session().expect("读取会话失败").is_none());
}

#[test]
fn test_pure_voxel_removal_still_aborts() {
    // 未放过料的工件: 预检补建空会话，扩展台账单独支撑结算
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();
    let recipe = copper_recipe(5);

    let outcome = flow
        .on_voxel_removing(&mut store, &recipe, true)
        .expect("预检失败");
    assert_eq!(outcome, LifecycleOutcome::SessionEnsured);

    store
        .put_extension("chisel-mod", &RawModifierRecord::new(Some(10), None, None))
        .expect("写入扩展记录失败");

    // 10 体素 × 2.0 质量 = 20 → 4 单元
    let outcome = flow
        .on_voxel_removed(&mut store, &recipe, false, anvil_pos())
        .expect("中止判定失败");
    assert_eq!(outcome, LifecycleOutcome::Aborted { bits_issued: 4 });
    assert_eq!(sink.spawn_count(), 1);
}

#[test]
fn test_abort_aggregates_extension_ledger() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);
    store
        .put_extension("mod-a", &RawModifierRecord::new(Some(5), None, None))
        .expect("写入扩展记录失败");
    store
        .put_extension("mod-b", &RawModifierRecord::new(Some(-3), Some(1), None))
        .expect("写入扩展记录失败");

    // 净值 (体素 2, 锭 1, 板 0): (1+1)×100 + 2×2.0 = 204 → 40 单元
    let outcome = flow
        .on_voxel_removed(&mut store, &copper_recipe(5), false, anvil_pos())
        .expect("中止判定失败");
    assert_eq!(outcome, LifecycleOutcome::Aborted { bits_issued: 40 });

    // 台账随会话一并清理
    assert!(store.extension_entries().expect("读取扩展记录失败").is_empty());
}

#[test]
fn test_abort_skips_malformed_extension_entry() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    place_ingots(&flow, &mut store, 1);
    store
        .put_extension("good-mod", &RawModifierRecord::new(Some(5), None, None))
        .expect("写入扩展记录失败");
    store.insert_raw("salvage:ext:broken-mod", serde_json::json!("not a record"));

    // 坏记录整条跳过: 100 + 5×2.0 = 110 → 22 单元
    let outcome = flow
        .on_voxel_removed(&mut store, &copper_recipe(5), false, anvil_pos())
        .expect("中止判定失败");
    assert_eq!(outcome, LifecycleOutcome::Aborted { bits_issued: 22 });
}

#[test]
fn test_heat_state_carries_into_issued_units() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();
    store.set_heat_state(Some(HeatState {
        temperature: 950.0,
        last_update_hours: 3.5,
    }));

    place_ingots(&flow, &mut store, 1);
    flow.on_voxel_removed(&mut store, &copper_recipe(5), false, anvil_pos())
        .expect("中止判定失败");

    let spawned = sink.spawned.lock().unwrap();
    let heat = spawned[0].0.heat.expect("碎料应继承工件热态");
    assert!((heat.temperature - 950.0).abs() < f64::EPSILON);
}

// ==========================================
// 禁用配方
// ==========================================

#[test]
fn test_disallowed_recipe_blocks_recovery_entirely() {
    let mut config = clean_config();
    config
        .disallowed_recipes
        .insert("game:knifeblade-copper".to_string());

    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(config, sink.clone());
    let mut store = MemoryAttributeStore::new();
    let recipe = copper_recipe(5);

    place_ingots(&flow, &mut store, 3);

    assert_eq!(
        flow.on_voxel_removing(&mut store, &recipe, true).expect("预检失败"),
        LifecycleOutcome::NoChange
    );
    assert_eq!(
        flow.on_voxel_removed(&mut store, &recipe, false, anvil_pos())
            .expect("中止判定失败"),
        LifecycleOutcome::NoChange
    );
    assert_eq!(
        flow.on_completion_check(&mut store, &recipe, true, Some("player-1"), anvil_pos())
            .expect("完成检查失败"),
        LifecycleOutcome::NoChange
    );

    // 不结算、不发放、不销毁
    assert_eq!(sink.spawn_count() + sink.give_count(), 0);
    let session = store.session().expect("读取会话失败").expect("会话应保留");
    assert_eq!(session.ingot_count(), 3);
}

// ==========================================
// 幂等与累计性质
// ==========================================

#[test]
fn test_terminal_events_are_idempotent() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();
    let recipe = copper_recipe(0);

    place_ingots(&flow, &mut store, 1);
    flow.on_completion_check(&mut store, &recipe, true, None, anvil_pos())
        .expect("完成检查失败");
    assert_eq!(sink.spawn_count(), 1);

    // 会话已销毁: 再次完成/中止均为空操作，无新发放
    assert_eq!(
        flow.on_completion_check(&mut store, &recipe, true, None, anvil_pos())
            .expect("完成检查失败"),
        LifecycleOutcome::NoChange
    );
    assert_eq!(
        flow.on_voxel_removed(&mut store, &recipe, false, anvil_pos())
            .expect("中止判定失败"),
        LifecycleOutcome::NoChange
    );
    assert_eq!(sink.spawn_count(), 1);

    // 重复删除同样安全
    store.remove_session().expect("删除会话失败");
    store.remove_session().expect("删除会话失败");
}

#[test]
fn test_split_placements_accumulate_like_single() {
    let flow = SessionLifecycle::new(
        clean_config(),
        Arc::new(RecipeVoxelIndex::new()),
        Arc::new(NoOpUnitSink),
    );

    let mut split = MemoryAttributeStore::new();
    place_ingots(&flow, &mut split, 2);
    place_ingots(&flow, &mut split, 3);

    let mut single = MemoryAttributeStore::new();
    place_ingots(&flow, &mut single, 5);

    let split_session = split.session().expect("读取会话失败").expect("会话缺失");
    let single_session = single.session().expect("读取会话失败").expect("会话缺失");
    assert_eq!(split_session, single_session);
    assert_eq!(split_session.ingot_count(), 5);
}

#[test]
fn test_oversized_stack_decrease_caps_at_byte_range() {
    let flow = SessionLifecycle::new(
        clean_config(),
        Arc::new(RecipeVoxelIndex::new()),
        Arc::new(NoOpUnitSink),
    );
    let mut store = MemoryAttributeStore::new();

    // 一次观测到 500 的减少量，入账上限为单字节 255
    let outcome = flow
        .on_material_placed(&mut store, &ingot_snapshot(500), None)
        .expect("放料事件处理失败");
    assert_eq!(
        outcome,
        LifecycleOutcome::Recorded {
            kind: MaterialKind::Ingot,
            amount: 255
        }
    );

    let session = store.session().expect("读取会话失败").expect("会话缺失");
    assert_eq!(session.ingot_count(), 255);
}

// ==========================================
// 碎料标识派生
// ==========================================

#[test]
fn test_unit_identity_derived_from_recipe_ingredient() {
    let sink = Arc::new(RecordingSink::accepting());
    let flow = flow_with(clean_config(), sink.clone());
    let mut store = MemoryAttributeStore::new();

    // 锡片配方: 碎料标识取自配方原料而非实际放入的物品
    store.put_session(&WorkSession::with_counts(1, 0)).expect("写入会话失败");
    flow.on_voxel_removed(
        &mut store,
        &recipe("lamellae-tin", "metalplate-tin", 5),
        false,
        anvil_pos(),
    )
    .expect("中止判定失败");

    let spawned = sink.spawned.lock().unwrap();
    assert_eq!(spawned[0].0.code.to_string(), "game:metalbit-tin");
}
