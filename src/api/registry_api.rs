// ==========================================
// 监考排班系统 - 注册表 API
// ==========================================
// 职责: 监考员 / 考场管理与名册导入
// ==========================================

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::api::{actor_or_system, current_time};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::invigilator::Invigilator;
use crate::domain::types::{RecordStatus, Weekday};
use crate::domain::venue::Venue;
use crate::importer::{ImportReport, RosterImporter};
use crate::registry::{InvigilatorRegistry, NewInvigilator, NewVenue, VenueRegistry};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::invigilator_repo::InvigilatorRepository;
use crate::repository::venue_repo::VenueRepository;

// ==========================================
// RegistryApi - 注册表 API
// ==========================================
pub struct RegistryApi {
    invigilators: Arc<InvigilatorRegistry>,
    venues: Arc<VenueRegistry>,
    invigilator_repo: Arc<InvigilatorRepository>,
    venue_repo: Arc<VenueRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    importer: RosterImporter,
}

impl RegistryApi {
    pub fn new(
        invigilators: Arc<InvigilatorRegistry>,
        venues: Arc<VenueRegistry>,
        invigilator_repo: Arc<InvigilatorRepository>,
        venue_repo: Arc<VenueRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            invigilators,
            venues,
            invigilator_repo,
            venue_repo,
            action_log_repo,
            importer: RosterImporter::new(),
        }
    }

    // ==========================================
    // 监考员
    // ==========================================

    pub fn register_invigilator(&self, input: NewInvigilator, operator: &str) -> ApiResult<Invigilator> {
        let now = current_time();
        let invigilator = self.invigilators.register(input, now)?;
        self.invigilator_repo.upsert(&invigilator)?;

        self.record(
            ActionLog::new(ActionType::RegisterInvigilator, actor_or_system(operator), now)
                .with_payload(json!({
                    "invigilator_id": invigilator.invigilator_id,
                    "availability": invigilator.availability_labels(),
                })),
        );
        Ok(invigilator)
    }

    /// 更新可用日 (标签不区分大小写)
    pub fn update_availability(
        &self,
        invigilator_id: &str,
        day_labels: &[String],
        operator: &str,
    ) -> ApiResult<Invigilator> {
        let days = day_labels
            .iter()
            .map(|label| {
                Weekday::parse(label)
                    .ok_or_else(|| ApiError::InvalidInput(format!("未知的星期标签: {}", label)))
            })
            .collect::<ApiResult<Vec<Weekday>>>()?;

        let invigilator = self.invigilators.update_availability(invigilator_id, &days)?;
        self.invigilator_repo.upsert(&invigilator)?;

        self.record(
            ActionLog::new(ActionType::UpdateAvailability, actor_or_system(operator), current_time())
                .with_payload(json!({
                    "invigilator_id": invigilator_id,
                    "availability": invigilator.availability_labels(),
                })),
        );
        Ok(invigilator)
    }

    pub fn set_invigilator_status(
        &self,
        invigilator_id: &str,
        status: RecordStatus,
        operator: &str,
    ) -> ApiResult<Invigilator> {
        let invigilator = self.invigilators.set_status(invigilator_id, status)?;
        self.invigilator_repo.upsert(&invigilator)?;
        self.record_status_change("invigilator", invigilator_id, status, operator);
        Ok(invigilator)
    }

    pub fn list_invigilators(&self) -> ApiResult<Vec<Invigilator>> {
        Ok(self.invigilators.list()?)
    }

    pub fn search_invigilators(&self, term: &str) -> ApiResult<Vec<Invigilator>> {
        Ok(self.invigilators.search(term)?)
    }

    // ==========================================
    // 考场
    // ==========================================

    pub fn register_venue(&self, input: NewVenue, operator: &str) -> ApiResult<Venue> {
        let venue = self.venues.register(input)?;
        self.venue_repo.upsert(&venue)?;

        self.record(
            ActionLog::new(ActionType::RegisterVenue, actor_or_system(operator), current_time())
                .with_payload(json!({
                    "venue_id": venue.venue_id,
                    "display_name": venue.display_name(),
                })),
        );
        Ok(venue)
    }

    pub fn set_venue_status(
        &self,
        venue_id: &str,
        status: RecordStatus,
        operator: &str,
    ) -> ApiResult<Venue> {
        let venue = self.venues.set_status(venue_id, status)?;
        self.venue_repo.upsert(&venue)?;
        self.record_status_change("venue", venue_id, status, operator);
        Ok(venue)
    }

    pub fn list_venues(&self) -> ApiResult<Vec<Venue>> {
        Ok(self.venues.list()?)
    }

    pub fn search_venues(&self, term: &str) -> ApiResult<Vec<Venue>> {
        Ok(self.venues.search(term)?)
    }

    // ==========================================
    // 名册导入
    // ==========================================

    pub fn import_invigilators<P: AsRef<Path>>(
        &self,
        path: P,
        operator: &str,
    ) -> ApiResult<ImportReport<Invigilator>> {
        let now = current_time();
        let report = self
            .importer
            .import_invigilators(path.as_ref(), &self.invigilators, now)?;

        for invigilator in &report.imported {
            self.invigilator_repo.upsert(invigilator)?;
        }

        self.record(
            ActionLog::new(ActionType::RegisterInvigilator, actor_or_system(operator), now)
                .with_payload(json!({
                    "file": path.as_ref().display().to_string(),
                    "imported": report.imported.len(),
                    "rejected": report.errors.len(),
                }))
                .with_detail("监考员名册导入"),
        );
        Ok(report)
    }

    pub fn import_venues<P: AsRef<Path>>(&self, path: P, operator: &str) -> ApiResult<ImportReport<Venue>> {
        let report = self.importer.import_venues(path.as_ref(), &self.venues)?;

        for venue in &report.imported {
            self.venue_repo.upsert(venue)?;
        }

        self.record(
            ActionLog::new(ActionType::RegisterVenue, actor_or_system(operator), current_time())
                .with_payload(json!({
                    "file": path.as_ref().display().to_string(),
                    "imported": report.imported.len(),
                    "rejected": report.errors.len(),
                }))
                .with_detail("考场名册导入"),
        );
        Ok(report)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn record_status_change(&self, entity: &str, id: &str, status: RecordStatus, operator: &str) {
        self.record(
            ActionLog::new(ActionType::SetStatus, actor_or_system(operator), current_time())
                .with_payload(json!({
                    "entity": entity,
                    "id": id,
                    "status": status.to_db_str(),
                })),
        );
    }

    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!("记录操作日志失败: {}", e);
        }
    }
}
