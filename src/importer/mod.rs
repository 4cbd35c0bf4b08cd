// ==========================================
// 监考排班系统 - 导入层
// ==========================================
// 职责: 外部名册导入, 经注册表校验后登记
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod roster_importer;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use roster_importer::{parse_availability, ImportReport, ImportRowError, RosterImporter};
