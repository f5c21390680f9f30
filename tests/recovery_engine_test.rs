// ==========================================
// 回收核算性质测试
// ==========================================
// 测试范围:
// 1. 扩展修正值的边界校验与字段级拒绝
// 2. 核算结果对投入量的单调性
// 3. 预估与实际结算的一致性
// 4. 零投入/零系数下的退化行为
// ==========================================


use forming_salvage::engine::issuance::NoOpUnitSink;
use forming_salvage::{
    ExtensionLedger, ExtensionModifier, LifecycleOutcome, MemoryAttributeStore, ModifierField,
    ModifierTotals, RawModifierRecord, RecipeVoxelIndex, RecoveryEngine, SalvageEstimate,
    SessionLifecycle, WorkItemStore, WorkSession,
};
use std::sync::Arc;
use test_helpers::{anvil_pos, clean_config, copper_recipe};

// ==========================================
// 扩展修正值边界
// ==========================================

#[test]
fn test_boundary_modifier_validates_unchanged() {
    let raw = RawModifierRecord::new(Some(127), Some(-128), Some(0));
    let (modifier, violations) = ExtensionModifier::validate("edge-mod", &raw);

    assert!(violations.is_empty());
    assert_eq!(modifier.voxels, 127);
    assert_eq!(modifier.ingots, -128);
    assert_eq!(modifier.plates, 0);
}

#[test]
fn test_out_of_range_field_zeroed_with_violation() {
    let raw = RawModifierRecord::new(Some(128), Some(2), None);
    let (modifier, violations) = ExtensionModifier::validate("hot-mod", &raw);

    // 仅越界字段归零，其余字段保留
    assert_eq!(modifier.voxels, 0);
    assert_eq!(modifier.ingots, 2);
    assert_eq!(modifier.plates, 0);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].contributor, "hot-mod");
    assert_eq!(violations[0].field, ModifierField::Voxels);
    assert_eq!(violations[0].value, 128);
}

#[test]
fn test_all_zero_modifier_excluded_from_ledger() {
    let entries = vec![
        ("empty-mod".to_string(), RawModifierRecord::new(Some(0), None, Some(0))),
        ("real-mod".to_string(), RawModifierRecord::new(Some(3), None, None)),
    ];
    let (ledger, violations) = ExtensionLedger::from_entries(&entries);

    assert!(violations.is_empty());
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.aggregate(), ModifierTotals { voxels: 3, ingots: 0, plates: 0 });
}

// ==========================================
// 单调性
// ==========================================

#[test]
fn test_total_input_bits_monotonic_over_ingots() {
    let engine = RecoveryEngine::new(clean_config());
    let totals = ModifierTotals::default();

    let mut last = 0;
    for ingots in 0..=255u8 {
        let bits = engine.total_input_bits(&WorkSession::with_counts(ingots, 0), &totals);
        assert!(bits >= last, "锭数 {ingots} 时回收数下降");
        last = bits;
    }
}

#[test]
fn test_waste_return_bits_monotonic_over_extension_voxels() {
    let engine = RecoveryEngine::new(clean_config());
    let session = WorkSession::with_counts(1, 0);

    let mut last = 0;
    for extra in 0..=127 {
        let totals = ModifierTotals { voxels: extra, ingots: 0, plates: 0 };
        let waste = engine.waste_voxels(&session, 10, &totals);
        let bits = engine.waste_return_bits(waste);
        assert!(bits >= last, "扩展体素 {extra} 时回收数下降");
        last = bits;
    }
}

// ==========================================
// 预估与结算一致
// ==========================================

#[test]
fn test_estimate_matches_actual_settlement() {
    let flow = SessionLifecycle::new(
        clean_config(),
        Arc::new(RecipeVoxelIndex::new()),
        Arc::new(NoOpUnitSink),
    );
    let recipe = copper_recipe(7);

    for ingots in 1..=4u8 {
        let mut store = MemoryAttributeStore::new();
        store
            .put_session(&WorkSession::with_counts(ingots, 0))
            .expect("写入会话失败");

        let estimate = flow.completion_estimate(&store, &recipe).expect("预估失败");
        let estimated_bits = match estimate {
            SalvageEstimate::NoLoss { bits } => bits,
            SalvageEstimate::SomeLoss { bits, .. } => bits,
            SalvageEstimate::NeedsMore => panic!("投料充足时不应提示缺料"),
        };

        let outcome = flow
            .on_completion_check(&mut store, &recipe, true, None, anvil_pos())
            .expect("完成检查失败");
        assert_eq!(
            outcome,
            LifecycleOutcome::Completed { bits_issued: estimated_bits },
            "锭数 {ingots} 时预估与结算不一致"
        );
    }
}

// ==========================================
// 退化行为
// ==========================================

#[test]
fn test_zero_modifier_recovers_nothing_on_completion() {
    let mut config = clean_config();
    config.recovery_modifier = 0.0;
    let engine = RecoveryEngine::new(config);

    let session = WorkSession::with_counts(4, 2);
    let waste = engine.waste_voxels(&session, 0, &ModifierTotals::default());
    assert!(waste > 0);
    assert_eq!(engine.waste_return_bits(waste), 0);
}

#[test]
fn test_empty_session_recovers_zero() {
    let engine = RecoveryEngine::new(clean_config());
    let session = WorkSession::new();

    assert!(!session.has_inputs());
    assert_eq!(engine.total_input_bits(&session, &ModifierTotals::default()), 0);
    assert_eq!(engine.waste_return_bits(0), 0);
}
