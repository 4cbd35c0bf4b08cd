// ==========================================
// 监考排班系统 - 分配草稿生成器
// ==========================================
// 输入: 生成窗口 + 监考员快照 + 考场注册表
// 输出: 草稿分配 + 逐日生成摘要
// ==========================================
// 规则:
// 1) 窗口内逐日推导星期 (纯日期计算)
// 2) 当日可用监考员为空 → 当日所有考场跳过
// 3) 按考场注册顺序轮询: venue[i] → available[i mod n]
// 4) 不做跨日均衡, n < 考场数时同一人当日可被分到多个考场
// ==========================================
// 红线: 不修改已有分配; 不检查考场独占 (由 LifecycleManager 负责)
// ==========================================

use crate::domain::allocation::Allocation;
use crate::domain::invigilator::Invigilator;
use crate::domain::types::Weekday;
use crate::domain::venue::Venue;
use crate::engine::availability::AvailabilityIndex;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 默认窗口天数
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

// ==========================================
// 生成结果
// ==========================================

/// 单日生成摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub available_count: usize,
    pub venue_count: usize,
    pub produced_count: usize,
    pub skip_reason: Option<String>,
}

/// 一次生成的完整结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub allocations: Vec<Allocation>,
    pub days: Vec<DaySummary>,
}

impl GenerationReport {
    /// 被跳过的日期数
    pub fn skipped_days(&self) -> usize {
        self.days.iter().filter(|d| d.skip_reason.is_some()).count()
    }
}

// ==========================================
// AllocationGenerator - 草稿生成器
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationGenerator {
    max_window_days: u32,
}

impl AllocationGenerator {
    /// 构造函数
    ///
    /// # 参数
    /// - `max_window_days`: 单次生成允许的最大窗口天数
    pub fn new(max_window_days: u32) -> Self {
        Self { max_window_days }
    }

    /// 生成草稿分配
    ///
    /// # 参数
    /// - `window_start`: 窗口起始日期
    /// - `window_length_days`: 窗口天数 (>=1)
    /// - `invigilators`: 监考员快照 (含停用)
    /// - `venues`: 考场注册表 (注册顺序, 含停用)
    /// - `generated_at`: 生成时刻, 写入 created_at/updated_at
    ///
    /// # 返回
    /// - `Ok(GenerationReport)`: 草稿与逐日摘要
    /// - `Err(EngineError::Validation)`: 窗口非法
    #[instrument(skip(self, invigilators, venues), fields(
        invigilator_count = invigilators.len(),
        venue_count = venues.len()
    ))]
    pub fn generate_draft(
        &self,
        window_start: NaiveDate,
        window_length_days: u32,
        invigilators: &[Invigilator],
        venues: &[Venue],
        generated_at: NaiveDateTime,
    ) -> EngineResult<GenerationReport> {
        self.validate_window(window_start, window_length_days)?;

        let index = AvailabilityIndex::build(invigilators);
        let active_venues: Vec<&Venue> = venues.iter().filter(|v| v.is_active()).collect();

        let mut report = GenerationReport::default();

        for offset in 0..window_length_days {
            let date = window_start
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "窗口日期溢出: start={}, offset={}",
                        window_start, offset
                    ))
                })?;
            let weekday = Weekday::of(date);
            let available = index.index_for(weekday);

            let mut summary = DaySummary {
                date,
                weekday,
                available_count: available.len(),
                venue_count: active_venues.len(),
                produced_count: 0,
                skip_reason: None,
            };

            if available.is_empty() {
                summary.skip_reason = Some("NO_AVAILABLE_INVIGILATOR".to_string());
                tracing::debug!(%date, %weekday, "当日无可用监考员, 跳过全部考场");
                report.days.push(summary);
                continue;
            }
            if active_venues.is_empty() {
                summary.skip_reason = Some("NO_ACTIVE_VENUE".to_string());
                report.days.push(summary);
                continue;
            }

            for (venue_index, venue) in active_venues.iter().enumerate() {
                let invigilator = &available[venue_index % available.len()];
                report.allocations.push(Allocation::new_draft(
                    &invigilator.invigilator_id,
                    &venue.venue_id,
                    date,
                    generated_at,
                ));
                summary.produced_count += 1;
            }

            tracing::debug!(
                %date,
                %weekday,
                available = summary.available_count,
                produced = summary.produced_count,
                "当日草稿生成完成"
            );
            report.days.push(summary);
        }

        Ok(report)
    }

    fn validate_window(&self, window_start: NaiveDate, window_length_days: u32) -> EngineResult<()> {
        if window_length_days == 0 {
            return Err(EngineError::Validation("窗口天数必须大于0".to_string()));
        }
        if window_length_days > self.max_window_days {
            return Err(EngineError::Validation(format!(
                "窗口天数必须在1-{}之间, 实际={}",
                self.max_window_days, window_length_days
            )));
        }
        // 窗口末日必须可表示
        window_start
            .checked_add_days(Days::new(u64::from(window_length_days - 1)))
            .ok_or_else(|| EngineError::Validation(format!("窗口日期溢出: start={}", window_start)))?;
        Ok(())
    }
}

impl Default for AllocationGenerator {
    fn default() -> Self {
        Self::new(62)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AllocationStatus, RecordStatus};

    fn monday() -> NaiveDate {
        // 2024-01-22 是周一
        NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn invigilator(id: &str, days: &[Weekday]) -> Invigilator {
        Invigilator {
            invigilator_id: id.to_string(),
            name: id.to_string(),
            email: format!("{}@university.edu", id),
            phone: String::new(),
            availability: days.iter().copied().collect(),
            status: RecordStatus::Active,
            created_at: now(),
        }
    }

    fn venue(id: &str) -> Venue {
        Venue {
            venue_id: id.to_string(),
            name: "IT Block".to_string(),
            hall_number: format!("Hall {}", id),
            capacity: Some(50),
            status: RecordStatus::Active,
        }
    }

    fn pairs(report: &GenerationReport) -> Vec<(String, String)> {
        report
            .allocations
            .iter()
            .map(|a| (a.venue_id.clone(), a.invigilator_id.clone()))
            .collect()
    }

    #[test]
    fn test_round_robin_by_venue_index() {
        let invigilators = vec![
            invigilator("A", &[Weekday::Monday, Weekday::Wednesday]),
            invigilator("B", &[Weekday::Monday]),
        ];
        let venues = vec![venue("V1"), venue("V2")];

        let report = AllocationGenerator::default()
            .generate_draft(monday(), 1, &invigilators, &venues, now())
            .unwrap();

        assert_eq!(
            pairs(&report),
            vec![
                ("V1".to_string(), "A".to_string()),
                ("V2".to_string(), "B".to_string()),
            ]
        );
        assert!(report.allocations.iter().all(|a| a.weekday == Weekday::Monday));
    }

    #[test]
    fn test_wrap_assigns_same_invigilator_to_multiple_venues() {
        let invigilators = vec![invigilator("C", &[Weekday::Monday])];
        let venues = vec![venue("V1"), venue("V2")];

        let report = AllocationGenerator::default()
            .generate_draft(monday(), 1, &invigilators, &venues, now())
            .unwrap();

        assert_eq!(
            pairs(&report),
            vec![
                ("V1".to_string(), "C".to_string()),
                ("V2".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn test_days_without_availability_are_skipped() {
        let invigilators = vec![invigilator("A", &[Weekday::Monday, Weekday::Wednesday])];
        let venues = vec![venue("V1")];

        let report = AllocationGenerator::default()
            .generate_draft(monday(), 7, &invigilators, &venues, now())
            .unwrap();

        let dates: Vec<NaiveDate> = report.allocations.iter().map(|a| a.date).collect();
        assert_eq!(
            dates,
            vec![monday(), NaiveDate::from_ymd_opt(2024, 1, 24).unwrap()]
        );
        assert_eq!(report.days.len(), 7);
        assert_eq!(report.skipped_days(), 5);
    }

    #[test]
    fn test_inactive_records_are_never_referenced() {
        let mut retired = invigilator("A", &[Weekday::Monday]);
        retired.status = RecordStatus::Inactive;
        let invigilators = vec![retired, invigilator("B", &[Weekday::Monday])];
        let mut closed = venue("V1");
        closed.status = RecordStatus::Inactive;
        let venues = vec![closed, venue("V2"), venue("V3")];

        let report = AllocationGenerator::default()
            .generate_draft(monday(), 1, &invigilators, &venues, now())
            .unwrap();

        assert_eq!(
            pairs(&report),
            vec![
                ("V2".to_string(), "B".to_string()),
                ("V3".to_string(), "B".to_string()),
            ]
        );
    }

    #[test]
    fn test_drafts_carry_generation_instant_and_unique_ids() {
        let invigilators = vec![invigilator("A", &Weekday::ALL)];
        let venues = vec![venue("V1"), venue("V2"), venue("V3")];

        let report = AllocationGenerator::default()
            .generate_draft(monday(), 7, &invigilators, &venues, now())
            .unwrap();

        assert_eq!(report.allocations.len(), 21);
        let mut ids: Vec<&str> = report
            .allocations
            .iter()
            .map(|a| a.allocation_id.as_str())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 21);
        assert!(report.allocations.iter().all(|a| {
            a.status == AllocationStatus::Draft && a.created_at == now() && a.updated_at == now()
        }));
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let generator = AllocationGenerator::new(14);
        let result = generator.generate_draft(monday(), 0, &[], &[], now());
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = generator.generate_draft(monday(), 15, &[], &[], now());
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = generator.generate_draft(NaiveDate::MAX, 2, &[], &[], now());
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
}
