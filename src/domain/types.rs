// ==========================================
// 监考排班系统 - 领域类型定义
// ==========================================
// 依据: 数据模型 - Invigilator / Venue / Allocation
// 红线: 状态只能前进 (草稿 → 已审批 → 已发布)
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 星期 (Weekday)
// ==========================================
// 序列化格式: "Monday" ... "Sunday" (与持久化形态一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// 一周七天 (周一起始)
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// 由日历日期推导星期（纯计算，无时区）
    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    /// 从 0 开始的序号 (Monday=0)
    pub fn index(&self) -> usize {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
            Weekday::Saturday => 5,
            Weekday::Sunday => 6,
        }
    }

    /// 从标签解析星期（忽略大小写，允许三字母缩写）
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "monday" | "mon" => Some(Weekday::Monday),
            "tuesday" | "tue" => Some(Weekday::Tuesday),
            "wednesday" | "wed" => Some(Weekday::Wednesday),
            "thursday" | "thu" => Some(Weekday::Thursday),
            "friday" | "fri" => Some(Weekday::Friday),
            "saturday" | "sat" => Some(Weekday::Saturday),
            "sunday" | "sun" => Some(Weekday::Sunday),
            _ => None,
        }
    }

    /// 持久化标签
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 主数据状态 (Record Status)
// ==========================================
// 用于监考员与考场: 只停用,不删除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,   // 启用
    Inactive, // 停用
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl RecordStatus {
    /// 从字符串解析状态
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(RecordStatus::Active),
            "inactive" => Some(RecordStatus::Inactive),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        *self == RecordStatus::Active
    }
}

// ==========================================
// 分配状态 (Allocation Status)
// ==========================================
// 状态机: Draft --approve--> Approved --publish--> Published
// 红线: 无回退,无驳回
// 顺序: Draft < Approved < Published
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    Draft,     // 草稿
    Approved,  // 已审批 (监考员不可见)
    Published, // 已发布 (监考员可见)
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AllocationStatus {
    /// 从字符串解析状态
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(AllocationStatus::Draft),
            "approved" => Some(AllocationStatus::Approved),
            "published" => Some(AllocationStatus::Published),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AllocationStatus::Draft => "draft",
            AllocationStatus::Approved => "approved",
            AllocationStatus::Published => "published",
        }
    }

    /// 状态机中的下一状态（Published 为终态）
    pub fn next(&self) -> Option<Self> {
        match self {
            AllocationStatus::Draft => Some(AllocationStatus::Approved),
            AllocationStatus::Approved => Some(AllocationStatus::Published),
            AllocationStatus::Published => None,
        }
    }

    /// 是否允许从当前状态转换到目标状态
    pub fn can_transition_to(&self, target: AllocationStatus) -> bool {
        self.next() == Some(target)
    }

    /// 是否占用 (venue, date) 独占位
    pub fn holds_slot(&self) -> bool {
        matches!(self, AllocationStatus::Approved | AllocationStatus::Published)
    }
}
