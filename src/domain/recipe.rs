// ==========================================
// 锻造废料回收系统 - 配方视图
// ==========================================
// 宿主配方对象在本核心内的只读投影: 产出标识、原料标识、
// 目标体素网格与声明层数。体素匹配算法归宿主所有，
// 本核心只读取网格统计填充格数
// ==========================================

use crate::domain::types::ItemCode;

// ==========================================
// 锻打配方 (Smithing Recipe)
// ==========================================
// 网格按 [x][y][z] 索引；产出/原料均可缺失，
// 缺失时相关计算一律退化为零回收
#[derive(Debug, Clone)]
pub struct SmithingRecipe {
    output: Option<ItemCode>,     // 产出物品标识
    ingredient: Option<ItemCode>, // 原料物品标识（推导碎料标识用）
    voxels: Vec<Vec<Vec<bool>>>,  // 目标体素网格
    layer_count: u32,             // 声明层数（宿主匹配时的 y 向上界）
}

impl SmithingRecipe {
    pub fn new(
        output: Option<ItemCode>,
        ingredient: Option<ItemCode>,
        voxels: Vec<Vec<Vec<bool>>>,
        layer_count: u32,
    ) -> Self {
        Self {
            output,
            ingredient,
            voxels,
            layer_count,
        }
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn output(&self) -> Option<&ItemCode> {
        self.output.as_ref()
    }

    pub fn ingredient(&self) -> Option<&ItemCode> {
        self.ingredient.as_ref()
    }

    pub fn voxels(&self) -> &[Vec<Vec<bool>>] {
        &self.voxels
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }
}
