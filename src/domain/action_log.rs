// ==========================================
// 监考排班系统 - 操作日志领域模型
// ==========================================
// 红线: 所有成功写入必须记录
// 用途: 审计追踪
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,             // 日志ID
    pub action_type: ActionType,       // 操作类型
    pub action_ts: NaiveDateTime,      // 操作时间戳
    pub actor: String,                 // 操作人
    pub allocation_id: Option<String>, // 关联分配 (批量生成时为 None)
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,        // 详细描述
}

impl ActionLog {
    /// 创建日志 (ID 自动生成)
    pub fn new(action_type: ActionType, actor: &str, action_ts: NaiveDateTime) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type,
            action_ts,
            actor: actor.to_string(),
            allocation_id: None,
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_allocation(mut self, allocation_id: &str) -> Self {
        self.allocation_id = Some(allocation_id.to_string());
        self
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    GenerateDraft,       // 生成草稿
    Approve,             // 审批
    Publish,             // 发布
    RegisterInvigilator, // 新增监考员
    RegisterVenue,       // 新增考场
    UpdateAvailability,  // 修改可用日
    SetStatus,           // 启用/停用
}

impl ActionType {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActionType::GenerateDraft => "GENERATE_DRAFT",
            ActionType::Approve => "APPROVE",
            ActionType::Publish => "PUBLISH",
            ActionType::RegisterInvigilator => "REGISTER_INVIGILATOR",
            ActionType::RegisterVenue => "REGISTER_VENUE",
            ActionType::UpdateAvailability => "UPDATE_AVAILABILITY",
            ActionType::SetStatus => "SET_STATUS",
        }
    }

    /// 从字符串解析操作类型
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GENERATE_DRAFT" => Some(ActionType::GenerateDraft),
            "APPROVE" => Some(ActionType::Approve),
            "PUBLISH" => Some(ActionType::Publish),
            "REGISTER_INVIGILATOR" => Some(ActionType::RegisterInvigilator),
            "REGISTER_VENUE" => Some(ActionType::RegisterVenue),
            "UPDATE_AVAILABILITY" => Some(ActionType::UpdateAvailability),
            "SET_STATUS" => Some(ActionType::SetStatus),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
