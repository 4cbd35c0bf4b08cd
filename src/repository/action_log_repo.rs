// ==========================================
// 监考排班系统 - 操作日志数据仓储
// ==========================================
// 红线: 所有成功的写操作必须记录
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use self::core::ActionLogRepository;
