// ==========================================
// 监考排班系统 - 名册导入器
// ==========================================
// 输入: 监考员 / 考场名册 (.csv / .xlsx / .xls)
// 输出: 成功注册的记录 + 逐行错误
// ==========================================
// 规则:
// - 可用日列以 ';' 或 ',' 分隔, 星期标签不区分大小写
// - 单行校验失败只记入报告, 不影响其他行
// - 考场达到上限后, 其余行均被拒绝
// ==========================================

use crate::domain::invigilator::Invigilator;
use crate::domain::types::Weekday;
use crate::domain::venue::Venue;
use crate::engine::error::EngineError;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::registry::{InvigilatorRegistry, NewInvigilator, NewVenue, VenueRegistry};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

const NAME_COLUMNS: &[&str] = &["name", "full_name"];
const EMAIL_COLUMNS: &[&str] = &["email", "email_address"];
const PHONE_COLUMNS: &[&str] = &["phone", "phone_number"];
const AVAILABILITY_COLUMNS: &[&str] = &["availability", "available_days", "days"];
const VENUE_NAME_COLUMNS: &[&str] = &["name", "location", "venue"];
const HALL_COLUMNS: &[&str] = &["hall_number", "hall"];
const CAPACITY_COLUMNS: &[&str] = &["capacity"];

/// 单行导入错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// 导入报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport<T> {
    pub imported: Vec<T>,
    pub errors: Vec<ImportRowError>,
}

impl<T> Default for ImportReport<T> {
    fn default() -> Self {
        Self {
            imported: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> ImportReport<T> {
    fn reject(&mut self, error: ImportError) {
        self.errors.push(ImportRowError {
            row: error.row().unwrap_or_default(),
            message: error.to_string(),
        });
    }
}

/// 解析可用日列, 失败时返回无法识别的标签
pub fn parse_availability(raw: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for token in raw.split([';', ',']).map(str::trim).filter(|t| !t.is_empty()) {
        let day = Weekday::parse(token).ok_or_else(|| token.to_string())?;
        days.push(day);
    }
    Ok(days)
}

fn rejected(row: usize, error: EngineError) -> ImportError {
    ImportError::RegistryRejected {
        row,
        message: error.to_string(),
    }
}

fn require_columns(path: &Path, records: &[RawRecord], groups: &[&[&str]]) -> ImportResult<()> {
    let Some(first) = records.first() else {
        return Err(ImportError::EmptyRoster(path.display().to_string()));
    };
    for group in groups {
        if !group.iter().any(|c| first.fields.contains_key(*c)) {
            return Err(ImportError::MissingColumn(group[0].to_string()));
        }
    }
    Ok(())
}

// ==========================================
// RosterImporter - 名册导入器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RosterImporter {
    parser: UniversalFileParser,
}

impl RosterImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 导入监考员名册
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn import_invigilators<P: AsRef<Path>>(
        &self,
        path: P,
        registry: &InvigilatorRegistry,
        now: NaiveDateTime,
    ) -> ImportResult<ImportReport<Invigilator>> {
        let records = self.parser.parse(path.as_ref())?;
        require_columns(path.as_ref(), &records, &[NAME_COLUMNS, EMAIL_COLUMNS, AVAILABILITY_COLUMNS])?;

        let mut report = ImportReport::default();
        for record in &records {
            let availability = match parse_availability(record.get(AVAILABILITY_COLUMNS).unwrap_or("")) {
                Ok(days) => days,
                Err(label) => {
                    report.reject(ImportError::UnknownWeekday {
                        row: record.row,
                        label,
                    });
                    continue;
                }
            };

            let input = NewInvigilator {
                name: record.get(NAME_COLUMNS).unwrap_or("").to_string(),
                email: record.get(EMAIL_COLUMNS).unwrap_or("").to_string(),
                phone: record.get(PHONE_COLUMNS).unwrap_or("").to_string(),
                availability,
            };

            match registry.register(input, now) {
                Ok(invigilator) => report.imported.push(invigilator),
                Err(EngineError::Repository(e)) => return Err(ImportError::InternalError(e.to_string())),
                Err(e) => report.reject(rejected(record.row, e)),
            }
        }

        info!(
            imported = report.imported.len(),
            rejected = report.errors.len(),
            "监考员名册导入完成"
        );
        Ok(report)
    }

    /// 导入考场名册
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn import_venues<P: AsRef<Path>>(
        &self,
        path: P,
        registry: &VenueRegistry,
    ) -> ImportResult<ImportReport<Venue>> {
        let records = self.parser.parse(path.as_ref())?;
        require_columns(path.as_ref(), &records, &[VENUE_NAME_COLUMNS, HALL_COLUMNS])?;

        let mut report = ImportReport::default();
        for record in &records {
            let capacity = match record.get(CAPACITY_COLUMNS) {
                None => None,
                Some(raw) => match raw.parse::<u32>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        report.reject(ImportError::InvalidCapacity {
                            row: record.row,
                            value: raw.to_string(),
                        });
                        continue;
                    }
                },
            };

            let input = NewVenue {
                name: record.get(VENUE_NAME_COLUMNS).unwrap_or("").to_string(),
                hall_number: record.get(HALL_COLUMNS).unwrap_or("").to_string(),
                capacity,
            };

            match registry.register(input) {
                Ok(venue) => report.imported.push(venue),
                Err(EngineError::Repository(e)) => return Err(ImportError::InternalError(e.to_string())),
                Err(e) => {
                    if matches!(e, EngineError::CapacityExceeded { .. }) {
                        warn!(row = record.row, "考场已达上限, 该行被拒绝");
                    }
                    report.reject(rejected(record.row, e));
                }
            }
        }

        info!(
            imported = report.imported.len(),
            rejected = report.errors.len(),
            "考场名册导入完成"
        );
        Ok(report)
    }
}
