// ==========================================
// 监考排班系统 - 分配引擎编排器
// ==========================================
// 用途: 把注册表、生成器、生命周期管理器与存储串成一个入口
// ==========================================
// 锁顺序: 存储写锁 → 注册表读锁 (任何路径不得反向获取)
// 红线: generate/approve/publish 各自在一次写锁内完成 (含写穿), 失败时存储不变
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::allocation::Allocation;
use crate::domain::types::{AllocationStatus, Weekday};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::generator::{AllocationGenerator, GenerationReport};
use crate::engine::lifecycle::LifecycleManager;
use crate::engine::persistence::{AllocationWriteThrough, NoOpWriteThrough};
use crate::engine::query::QueryEngine;
use crate::registry::{InvigilatorRegistry, VenueRegistry};
use crate::repository::allocation_store::{AllocationStore, AllocationTable};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

// ==========================================
// TransitionOutcome - 批量转换的单条结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub allocation_id: String,
    pub allocation: Option<Allocation>,
    pub error: Option<String>,
}

impl TransitionOutcome {
    fn from_result(allocation_id: &str, result: EngineResult<Allocation>) -> Self {
        match result {
            Ok(allocation) => Self {
                allocation_id: allocation_id.to_string(),
                allocation: Some(allocation),
                error: None,
            },
            Err(e) => Self {
                allocation_id: allocation_id.to_string(),
                allocation: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

// ==========================================
// AllocationEngine - 分配引擎
// ==========================================
pub struct AllocationEngine {
    store: Arc<AllocationStore>,
    invigilators: Arc<InvigilatorRegistry>,
    venues: Arc<VenueRegistry>,
    generator: AllocationGenerator,
    lifecycle: LifecycleManager,
    query: QueryEngine,
    write_through: Arc<dyn AllocationWriteThrough>,
}

impl AllocationEngine {
    /// 创建引擎实例
    ///
    /// # 参数
    /// - store: 分配存储
    /// - invigilators / venues: 注册表 (引擎只读)
    /// - config: 分配配置 (窗口上限)
    pub fn new(
        store: Arc<AllocationStore>,
        invigilators: Arc<InvigilatorRegistry>,
        venues: Arc<VenueRegistry>,
        config: &AllocationConfig,
    ) -> Self {
        Self {
            query: QueryEngine::new(store.clone()),
            generator: AllocationGenerator::new(config.max_window_days),
            lifecycle: LifecycleManager::new(),
            store,
            invigilators,
            venues,
            write_through: Arc::new(NoOpWriteThrough),
        }
    }

    /// 挂接写穿 (SQLite 仓储等)
    pub fn with_write_through(mut self, write_through: Arc<dyn AllocationWriteThrough>) -> Self {
        self.write_through = write_through;
        self
    }

    pub fn store(&self) -> &Arc<AllocationStore> {
        &self.store
    }

    pub fn query(&self) -> &QueryEngine {
        &self.query
    }

    pub fn invigilators(&self) -> &Arc<InvigilatorRegistry> {
        &self.invigilators
    }

    pub fn venues(&self) -> &Arc<VenueRegistry> {
        &self.venues
    }

    // ==========================================
    // 写路径
    // ==========================================

    /// 生成草稿并追加到存储
    ///
    /// 先取存储写锁再读注册表快照, 两次并发生成不会交错追加。
    #[instrument(skip(self))]
    pub fn generate_draft(
        &self,
        window_start: NaiveDate,
        window_length_days: u32,
        now: NaiveDateTime,
    ) -> EngineResult<GenerationReport> {
        let mut table = self.store.write()?;

        let invigilators = self.invigilators.list()?;
        let venues = self.venues.list()?;

        let report = self.generator.generate_draft(
            window_start,
            window_length_days,
            &invigilators,
            &venues,
            now,
        )?;

        let before = table.len();
        table.append(report.allocations.clone())?;
        if let Err(e) = self.write_through.persist_drafts(&report.allocations) {
            table.truncate(before);
            error!(error = %e, "草稿写库失败, 已撤销追加");
            return Err(EngineError::Persistence(e));
        }
        drop(table);

        info!(
            produced = report.allocations.len(),
            skipped_days = report.skipped_days(),
            "草稿生成完成"
        );
        Ok(report)
    }

    /// 审批单条草稿
    #[instrument(skip(self))]
    pub fn approve(&self, allocation_id: &str, now: NaiveDateTime) -> EngineResult<Allocation> {
        let mut table = self.store.write()?;
        let previous = table.get(allocation_id).cloned();
        let result = self
            .lifecycle
            .approve(&mut table, allocation_id, now)
            .and_then(|a| self.commit_transition(&mut table, previous, a));
        drop(table);

        match &result {
            Ok(a) => info!(venue_id = %a.venue_id, date = %a.date, "分配已审批"),
            Err(e @ EngineError::Persistence(_)) => error!(error = %e, "审批写库失败, 已回滚"),
            Err(e) => warn!(error = %e, "审批被拒绝"),
        }
        result
    }

    /// 发布单条已审批分配
    #[instrument(skip(self))]
    pub fn publish(&self, allocation_id: &str, now: NaiveDateTime) -> EngineResult<Allocation> {
        let mut table = self.store.write()?;
        let previous = table.get(allocation_id).cloned();
        let result = self
            .lifecycle
            .publish(&mut table, allocation_id, now)
            .and_then(|a| self.commit_transition(&mut table, previous, a));
        drop(table);

        match &result {
            Ok(a) => info!(invigilator_id = %a.invigilator_id, date = %a.date, "分配已发布"),
            Err(e @ EngineError::Persistence(_)) => error!(error = %e, "发布写库失败, 已回滚"),
            Err(e) => warn!(error = %e, "发布被拒绝"),
        }
        result
    }

    /// 写穿单条状态变更, 失败时恢复旧值
    fn commit_transition(
        &self,
        table: &mut AllocationTable,
        previous: Option<Allocation>,
        allocation: Allocation,
    ) -> EngineResult<Allocation> {
        match self.write_through.persist_transition(&allocation) {
            Ok(()) => Ok(allocation),
            Err(e) => {
                if let Some(previous) = previous {
                    table.restore(previous);
                }
                Err(EngineError::Persistence(e))
            }
        }
    }

    /// 逐条审批 (互不回滚, 写库失败记入该条结果)
    pub fn approve_many(&self, allocation_ids: &[String], now: NaiveDateTime) -> Vec<TransitionOutcome> {
        allocation_ids
            .iter()
            .map(|id| TransitionOutcome::from_result(id, self.approve(id, now)))
            .collect()
    }

    /// 逐条发布 (互不回滚, 写库失败记入该条结果)
    pub fn publish_many(&self, allocation_ids: &[String], now: NaiveDateTime) -> Vec<TransitionOutcome> {
        allocation_ids
            .iter()
            .map(|id| TransitionOutcome::from_result(id, self.publish(id, now)))
            .collect()
    }

    // ==========================================
    // 读路径
    // ==========================================

    pub fn list_for_invigilator(
        &self,
        invigilator_id: &str,
        status_filter: Option<AllocationStatus>,
    ) -> EngineResult<Vec<Allocation>> {
        self.query.list_for_invigilator(invigilator_id, status_filter)
    }

    /// 按星期标签查询 (不区分大小写)
    pub fn list_by_day(&self, weekday_label: &str) -> EngineResult<Vec<Allocation>> {
        let weekday = Weekday::parse(weekday_label).ok_or_else(|| {
            EngineError::Validation(format!("未知的星期标签: {}", weekday_label))
        })?;
        self.query.list_by_day(weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NewInvigilator, NewVenue};
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()
    }

    fn engine_with(days: &[&[Weekday]], venue_count: usize) -> AllocationEngine {
        let invigilators = Arc::new(InvigilatorRegistry::new());
        for (i, d) in days.iter().enumerate() {
            invigilators
                .register(
                    NewInvigilator {
                        name: format!("Invigilator {}", i),
                        email: format!("inv{}@university.edu", i),
                        phone: String::new(),
                        availability: d.to_vec(),
                    },
                    at(8),
                )
                .unwrap();
        }
        let venues = Arc::new(VenueRegistry::default());
        for i in 0..venue_count {
            venues
                .register(NewVenue {
                    name: "IT Block".to_string(),
                    hall_number: format!("Hall {}", 200 + i),
                    capacity: Some(50),
                })
                .unwrap();
        }
        AllocationEngine::new(
            Arc::new(AllocationStore::new()),
            invigilators,
            venues,
            &AllocationConfig::default(),
        )
    }

    #[test]
    fn test_generate_appends_to_store() {
        let engine = engine_with(&[&[Weekday::Monday]], 2);
        let report = engine.generate_draft(monday(), 7, at(9)).unwrap();

        assert_eq!(report.allocations.len(), 2);
        assert_eq!(engine.store().read().unwrap().len(), 2);

        // 再次生成只追加, 不改动已有记录
        engine.generate_draft(monday(), 1, at(10)).unwrap();
        assert_eq!(engine.store().read().unwrap().len(), 4);
    }

    #[test]
    fn test_failed_generation_leaves_store_untouched() {
        let engine = engine_with(&[&[Weekday::Monday]], 1);
        assert!(matches!(
            engine.generate_draft(monday(), 0, at(9)),
            Err(EngineError::Validation(_))
        ));
        assert!(engine.store().read().unwrap().is_empty());
    }

    #[test]
    fn test_batch_outcomes_are_independent() {
        let engine = engine_with(&[&[Weekday::Monday]], 1);
        engine.generate_draft(monday(), 1, at(9)).unwrap();
        engine.generate_draft(monday(), 1, at(9)).unwrap();
        let ids: Vec<String> = engine
            .store()
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|a| a.allocation_id)
            .collect();

        let mut requested = ids.clone();
        requested.push("missing".to_string());
        let outcomes = engine.approve_many(&requested, at(10));

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].succeeded());
        // 同一 (venue, date) 的第二条冲突
        assert!(!outcomes[1].succeeded());
        assert!(!outcomes[2].succeeded());

        let published = engine.publish_many(&ids, at(11));
        assert!(published[0].succeeded());
        assert!(!published[1].succeeded());
    }

    /// 可切换的写穿挂钩: failing 为 true 时返回库错误
    #[derive(Default)]
    struct FlakyWriteThrough {
        failing: AtomicBool,
        persisted: Mutex<Vec<(String, AllocationStatus)>>,
    }

    impl FlakyWriteThrough {
        fn check(&self) -> RepositoryResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl AllocationWriteThrough for FlakyWriteThrough {
        fn persist_drafts(&self, drafts: &[Allocation]) -> RepositoryResult<()> {
            self.check()?;
            let mut persisted = self.persisted.lock().unwrap();
            persisted.extend(drafts.iter().map(|a| (a.allocation_id.clone(), a.status)));
            Ok(())
        }

        fn persist_transition(&self, allocation: &Allocation) -> RepositoryResult<()> {
            self.check()?;
            self.persisted
                .lock()
                .unwrap()
                .push((allocation.allocation_id.clone(), allocation.status));
            Ok(())
        }
    }

    fn flaky_engine(venue_count: usize) -> (AllocationEngine, Arc<FlakyWriteThrough>) {
        let hook = Arc::new(FlakyWriteThrough::default());
        let engine = engine_with(&[&[Weekday::Monday]], venue_count).with_write_through(hook.clone());
        (engine, hook)
    }

    #[test]
    fn test_failed_write_through_rolls_back_transition() {
        let (engine, hook) = flaky_engine(1);
        let id = engine.generate_draft(monday(), 1, at(9)).unwrap().allocations[0]
            .allocation_id
            .clone();

        hook.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            engine.approve(&id, at(10)),
            Err(EngineError::Persistence(_))
        ));
        let current = engine.store().find_by_id(&id).unwrap().unwrap();
        assert_eq!(current.status, AllocationStatus::Draft);
        assert_eq!(current.updated_at, at(9));

        // 恢复后重试成功
        hook.failing.store(false, Ordering::SeqCst);
        let approved = engine.approve(&id, at(11)).unwrap();
        assert_eq!(approved.status, AllocationStatus::Approved);

        hook.failing.store(true, Ordering::SeqCst);
        assert!(engine.publish(&id, at(12)).is_err());
        assert_eq!(
            engine.store().find_by_id(&id).unwrap().unwrap().status,
            AllocationStatus::Approved
        );
    }

    #[test]
    fn test_failed_write_through_undoes_generation() {
        let (engine, hook) = flaky_engine(2);
        engine.generate_draft(monday(), 1, at(9)).unwrap();

        hook.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            engine.generate_draft(monday(), 7, at(10)),
            Err(EngineError::Persistence(_))
        ));
        assert_eq!(engine.store().read().unwrap().len(), 2);
        assert_eq!(hook.persisted.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_batch_records_write_failure_per_outcome() {
        let (engine, hook) = flaky_engine(2);
        let ids: Vec<String> = engine
            .generate_draft(monday(), 1, at(9))
            .unwrap()
            .allocations
            .into_iter()
            .map(|a| a.allocation_id)
            .collect();

        hook.failing.store(true, Ordering::SeqCst);
        let outcomes = engine.approve_many(&ids, at(10));
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.succeeded()));
        assert!(outcomes
            .iter()
            .all(|o| o.error.as_deref().is_some_and(|e| e.contains("写库失败"))));
        assert_eq!(engine.query().status_counts().unwrap().draft, 2);
    }

    #[test]
    fn test_list_by_day_parses_label() {
        let engine = engine_with(&[&[Weekday::Monday]], 1);
        engine.generate_draft(monday(), 7, at(9)).unwrap();

        assert_eq!(engine.list_by_day("monday").unwrap().len(), 1);
        assert!(engine.list_by_day("Tuesday").unwrap().is_empty());
        assert!(matches!(
            engine.list_by_day("Funday"),
            Err(EngineError::Validation(_))
        ));
    }
}
