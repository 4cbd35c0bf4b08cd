// ==========================================
// 监考排班系统 - 可用性索引
// ==========================================
// 输入: 监考员集合 (当前快照)
// 输出: 每个星期的启用且可用监考员有序列表
// ==========================================
// 红线: 纯读投影, 无副作用
// 排序: 按 invigilator_id 升序, 同一次生成内稳定
// ==========================================

use crate::domain::invigilator::Invigilator;
use crate::domain::types::Weekday;

// ==========================================
// AvailabilityIndex - 可用性索引
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    buckets: [Vec<Invigilator>; 7],
}

impl AvailabilityIndex {
    /// 基于监考员快照构建索引
    ///
    /// 停用监考员不进入任何桶; 每个桶按ID排序。
    pub fn build(invigilators: &[Invigilator]) -> Self {
        let mut buckets: [Vec<Invigilator>; 7] = Default::default();

        for invigilator in invigilators.iter().filter(|i| i.is_active()) {
            for day in &invigilator.availability {
                buckets[day.index()].push(invigilator.clone());
            }
        }

        for bucket in buckets.iter_mut() {
            bucket.sort_by(|a, b| a.invigilator_id.cmp(&b.invigilator_id));
        }

        Self { buckets }
    }

    /// 指定星期的可用监考员 (有序)
    pub fn index_for(&self, weekday: Weekday) -> &[Invigilator] {
        &self.buckets[weekday.index()]
    }

    /// 指定星期的可用人数
    pub fn available_count(&self, weekday: Weekday) -> usize {
        self.buckets[weekday.index()].len()
    }
}
