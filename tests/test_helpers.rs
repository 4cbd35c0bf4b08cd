// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时数据库、应用状态与主数据录入
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use invigilation_aps::app::AppState;
use invigilation_aps::engine::AllocationEventPublisher;
use invigilation_aps::logging;
use invigilation_aps::domain::types::Weekday;
use invigilation_aps::domain::{Invigilator, Venue};
use invigilation_aps::registry::{NewInvigilator, NewVenue};
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const OPERATOR: &str = "test_admin";

/// 创建临时测试数据库并初始化应用状态
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
/// - AppState: 已建表的应用状态
pub fn create_test_state() -> Result<(NamedTempFile, String, AppState), Box<dyn Error>> {
    logging::init_test();
    let (temp_file, db_path) = temp_db()?;
    let state = AppState::new(db_path.clone())?;
    Ok((temp_file, db_path, state))
}

/// 创建挂接事件发布器的应用状态
pub fn create_test_state_with_publisher(
    publisher: Arc<dyn AllocationEventPublisher>,
) -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    logging::init_test();
    let (temp_file, db_path) = temp_db()?;
    let state = AppState::with_event_publisher(db_path, publisher)?;
    Ok((temp_file, state))
}

fn temp_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径非 UTF-8")?
        .to_string();
    Ok((temp_file, db_path))
}

/// 模拟重启: 基于同一数据库文件重新装配应用状态
pub fn reopen_state(db_path: &str) -> Result<AppState, Box<dyn Error>> {
    Ok(AppState::new(db_path.to_string())?)
}

/// 2024-01-22 (周一)
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()
}

/// 周一之后第 n 天
pub fn monday_plus(days: u64) -> NaiveDate {
    monday().checked_add_days(chrono::Days::new(days)).unwrap()
}

/// 登记监考员
pub fn add_invigilator(state: &AppState, name: &str, days: &[Weekday]) -> Invigilator {
    state
        .registry_api
        .register_invigilator(
            NewInvigilator {
                name: name.to_string(),
                email: format!("{}@example.edu", name.to_lowercase()),
                phone: String::new(),
                availability: days.to_vec(),
            },
            OPERATOR,
        )
        .unwrap()
}

/// 登记考场
pub fn add_venue(state: &AppState, name: &str, hall: &str) -> Venue {
    state
        .registry_api
        .register_venue(
            NewVenue {
                name: name.to_string(),
                hall_number: hall.to_string(),
                capacity: Some(40),
            },
            OPERATOR,
        )
        .unwrap()
}

/// 写入带扩展名的临时名册文件
pub fn write_roster(extension: &str, lines: &[&str]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(file)
}
