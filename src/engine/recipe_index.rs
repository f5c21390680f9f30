// ==========================================
// 锻造废料回收系统 - 配方体素索引
// ==========================================
// 职责: 记忆化"配方产出标识 → 成品所需体素数"
// 生命周期: 一个已加载的世界会话，随引擎构造注入
// ==========================================
// 并发: 多工件并发读安全；写入由互斥锁串行化，
// 竞争时的重复计算无害（计算结果确定）
// ==========================================

use crate::domain::recipe::SmithingRecipe;
use crate::domain::types::ItemCode;
use std::collections::HashMap;
use std::sync::Mutex;

// ==========================================
// 配方体素索引 (Recipe Voxel Index)
// ==========================================
#[derive(Debug, Default)]
pub struct RecipeVoxelIndex {
    cache: Mutex<HashMap<ItemCode, u16>>,
}

impl RecipeVoxelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 成品所需的体素数
    ///
    /// 无产出的配方直接返回 0 且不缓存；否则首次查询时扫描
    /// 整个目标网格统计填充格数并按产出标识缓存。同一产出
    /// 标识一经缓存永不重算，即使出现两个配方共享产出标识
    /// 的罕见情形（首算者胜）。
    pub fn required_voxels(&self, recipe: &SmithingRecipe) -> u16 {
        let Some(output) = recipe.output() else {
            return 0;
        };

        let mut cache = lock_cache(&self.cache);

        if let Some(&count) = cache.get(output) {
            return count;
        }

        let count = count_filled_cells(recipe.voxels());
        tracing::debug!(recipe = %output, required_voxels = count, "缓存配方体素数");
        cache.insert(output.clone(), count);
        count
    }

    /// 已缓存的配方数
    pub fn len(&self) -> usize {
        lock_cache(&self.cache).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 缓存值确定性可重算，锁中毒时直接复用内部数据
fn lock_cache(cache: &Mutex<HashMap<ItemCode, u16>>) -> std::sync::MutexGuard<'_, HashMap<ItemCode, u16>> {
    match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// 统计网格中填充的体素格数，超出 u16 上限时饱和
fn count_filled_cells(voxels: &[Vec<Vec<bool>>]) -> u16 {
    let filled: usize = voxels
        .iter()
        .flat_map(|plane| plane.iter())
        .flat_map(|row| row.iter())
        .filter(|&&cell| cell)
        .count();

    filled.min(u16::MAX as usize) as u16
}
