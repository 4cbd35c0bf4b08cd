// ==========================================
// 监考排班系统 - 引擎层事件发布
// ==========================================
// 职责: 定义分配事件发布 trait, 通知服务在此挂接
// 说明: Engine 层只定义 trait, 投递由外部适配器实现
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 分配事件类型
// ==========================================

/// 分配事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationEventType {
    /// 草稿批量生成
    DraftGenerated,
    /// 分配已审批
    AllocationApproved,
    /// 分配已发布 (监考员可见)
    AllocationPublished,
}

impl AllocationEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            AllocationEventType::DraftGenerated => "DraftGenerated",
            AllocationEventType::AllocationApproved => "AllocationApproved",
            AllocationEventType::AllocationPublished => "AllocationPublished",
        }
    }
}

/// 分配事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationEvent {
    pub event_type: AllocationEventType,
    /// 受影响的分配ID
    pub allocation_ids: Vec<String>,
    /// 受影响的日期范围 (闭区间)
    pub affected_date_range: Option<(NaiveDate, NaiveDate)>,
    /// 事件来源描述
    pub source: Option<String>,
    pub occurred_at: NaiveDateTime,
}

impl AllocationEvent {
    /// 草稿生成事件
    pub fn draft_generated(
        allocation_ids: Vec<String>,
        window: (NaiveDate, NaiveDate),
        occurred_at: NaiveDateTime,
    ) -> Self {
        Self {
            event_type: AllocationEventType::DraftGenerated,
            allocation_ids,
            affected_date_range: Some(window),
            source: None,
            occurred_at,
        }
    }

    /// 单条分配状态变更事件
    pub fn single(
        event_type: AllocationEventType,
        allocation_id: &str,
        date: NaiveDate,
        occurred_at: NaiveDateTime,
    ) -> Self {
        Self {
            event_type,
            allocation_ids: vec![allocation_id.to_string()],
            affected_date_range: Some((date, date)),
            source: None,
            occurred_at,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 分配事件发布者
///
/// # 返回
/// - `Ok(task_id)`: 投递任务ID (如果支持) 或空字符串
/// - `Err`: 发布失败
pub trait AllocationEventPublisher: Send + Sync {
    fn publish(&self, event: AllocationEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl AllocationEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: AllocationEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            event_type = event.event_type.as_str(),
            count = event.allocation_ids.len(),
            "NoOpEventPublisher: 跳过事件发布"
        );
        Ok(String::new())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn AllocationEventPublisher>> 的使用
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn AllocationEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn AllocationEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件 (未配置发布者时直接返回空字符串)
    pub fn publish(&self, event: AllocationEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    event_type = event.event_type.as_str(),
                    "OptionalEventPublisher: 未配置发布者, 跳过事件"
                );
                Ok(String::new())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
