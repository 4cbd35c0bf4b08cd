// ==========================================
// 监考排班系统 - 注册表层
// ==========================================
// 职责: 监考员 / 考场的内存集合与管理端校验
// 说明: 引擎只读取快照, 写入全部经由注册表
// ==========================================

pub mod invigilator;
pub mod venue;

pub use invigilator::{InvigilatorRegistry, NewInvigilator};
pub use venue::{NewVenue, VenueRegistry, DEFAULT_MAX_ACTIVE_VENUES};
