// ==========================================
// 监考排班系统 - 考场领域模型
// ==========================================
// 依据: 数据模型 - Venue
// 红线: 启用考场总数不超过上限 (默认 20)
// ==========================================

use crate::domain::types::RecordStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Venue - 考场
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub venue_id: String,      // 考场ID
    pub name: String,          // 楼宇/位置 (例: IT Block)
    pub hall_number: String,   // 厅号 (例: Hall 201)
    pub capacity: Option<u32>, // 容量 (可选,正整数)
    pub status: RecordStatus,  // 启用/停用
}

impl Venue {
    /// 判断是否为启用状态
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// 显示名称
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.hall_number)
    }
}
