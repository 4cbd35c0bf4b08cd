// ==========================================
// 监考排班系统 - 监考员领域模型
// ==========================================
// 依据: 数据模型 - Invigilator
// 红线: 只停用,不删除; 可用日为星期集合,无重复
// ==========================================

use crate::domain::types::{RecordStatus, Weekday};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// Invigilator - 监考员
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invigilator {
    pub invigilator_id: String,         // 监考员ID
    pub name: String,                   // 姓名
    pub email: String,                  // 邮箱
    pub phone: String,                  // 电话 (可为空串)
    pub availability: BTreeSet<Weekday>, // 可用星期
    pub status: RecordStatus,           // 启用/停用
    pub created_at: NaiveDateTime,      // 创建时间
}

impl Invigilator {
    /// 判断是否为启用状态
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// 判断指定星期是否可用
    pub fn is_available_on(&self, weekday: Weekday) -> bool {
        self.availability.contains(&weekday)
    }

    /// 可用星期标签 (周一起始顺序)
    pub fn availability_labels(&self) -> Vec<&'static str> {
        self.availability.iter().map(|d| d.label()).collect()
    }
}
