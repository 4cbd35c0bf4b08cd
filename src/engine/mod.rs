// ==========================================
// 监考排班系统 - 引擎层
// ==========================================
// 职责: 分配生成、生命周期、查询; 写穿经 AllocationWriteThrough 挂钩
// 红线: Engine 不拼 SQL, 不读时钟 (时刻由调用方传入)
// ==========================================

pub mod availability;
pub mod error;
pub mod events;
pub mod generator;
pub mod lifecycle;
pub mod orchestrator;
pub mod persistence;
pub mod query;

// 重导出核心引擎
pub use availability::AvailabilityIndex;
pub use error::{EngineError, EngineResult};
pub use events::{
    AllocationEvent, AllocationEventPublisher, AllocationEventType, NoOpEventPublisher,
    OptionalEventPublisher,
};
pub use generator::{AllocationGenerator, DaySummary, GenerationReport, DEFAULT_WINDOW_DAYS};
pub use lifecycle::LifecycleManager;
pub use orchestrator::{AllocationEngine, TransitionOutcome};
pub use persistence::{AllocationWriteThrough, NoOpWriteThrough};
pub use query::{QueryEngine, StatusCounts};
