// ==========================================
// 监考排班系统 - 监考分配领域模型
// ==========================================
// 依据: 数据模型 - Allocation
// 红线: 创建后 invigilator/venue/date 不可变,只允许状态前进
// 持久化形态: {id, invigilatorId, venueId, date, weekday, status, createdAt, updatedAt}
// ==========================================

use crate::domain::types::{AllocationStatus, Weekday};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Allocation - 监考分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    #[serde(rename = "id")]
    pub allocation_id: String,     // 分配ID
    pub invigilator_id: String,    // 监考员
    pub venue_id: String,          // 考场
    pub date: NaiveDate,           // 日期 (YYYY-MM-DD)
    pub weekday: Weekday,          // 星期 (由日期推导)
    pub status: AllocationStatus,  // 状态
    pub created_at: NaiveDateTime, // 创建时间
    pub updated_at: NaiveDateTime, // 最近更新时间
}

impl Allocation {
    /// 创建草稿分配（仅供生成器使用）
    pub fn new_draft(
        invigilator_id: &str,
        venue_id: &str,
        date: NaiveDate,
        generated_at: NaiveDateTime,
    ) -> Self {
        Self {
            allocation_id: uuid::Uuid::new_v4().to_string(),
            invigilator_id: invigilator_id.to_string(),
            venue_id: venue_id.to_string(),
            date,
            weekday: Weekday::of(date),
            status: AllocationStatus::Draft,
            created_at: generated_at,
            updated_at: generated_at,
        }
    }

    /// 判断是否为草稿状态
    pub fn is_draft(&self) -> bool {
        self.status == AllocationStatus::Draft
    }

    /// 判断是否为已发布状态
    pub fn is_published(&self) -> bool {
        self.status == AllocationStatus::Published
    }

    /// 是否与另一条分配落在同一 (venue, date) 位
    pub fn shares_slot_with(&self, venue_id: &str, date: NaiveDate) -> bool {
        self.venue_id == venue_id && self.date == date
    }
}
