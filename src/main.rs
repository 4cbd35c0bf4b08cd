// ==========================================
// 监考排班系统 - 命令行入口
// ==========================================
// 用法: invigilation-aps <命令> [参数...]
// 数据库: $INVIGILATION_APS_DB_PATH 或用户数据目录
// 输出: 结果以 JSON 打印到 stdout, 日志写 stderr
// ==========================================

use std::error::Error;
use std::process::ExitCode;

use chrono::NaiveDate;
use serde::Serialize;

use invigilation_aps::app::{get_default_db_path, AppState};
use invigilation_aps::db::DATE_FORMAT;
use invigilation_aps::logging;

/// 操作人环境变量, 未设置时记为 cli
const OPERATOR_ENV: &str = "INVIGILATION_APS_OPERATOR";

const DEFAULT_ACTION_LIMIT: usize = 20;

const USAGE: &str = "用法: invigilation-aps <命令> [参数...]

命令:
  generate <起始日期 YYYY-MM-DD> [天数]   生成草稿分配
  approve <分配ID>...                     审批草稿
  publish <分配ID>...                     发布已审批分配
  list-day <星期>                         按星期列出分配
  list-invigilator <监考员ID> [状态]      按监考员列出分配
  list-range <开始日期> <结束日期> [状态] 按日期区间列出分配
  summary                                 管理端总览
  invigilator-summary <监考员ID>          监考员视图
  import-invigilators <文件>              导入监考员名册 (.csv/.xlsx)
  import-venues <文件>                    导入考场名册 (.csv/.xlsx)
  actions [条数]                          最近操作日志";

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "help" || args[0] == "--help" {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("命令执行失败: {}", e);
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)?;
    let operator = std::env::var(OPERATOR_ENV).unwrap_or_else(|_| "cli".to_string());

    let command = args[0].as_str();
    let rest = &args[1..];

    match command {
        "generate" => {
            let start = parse_date(required(rest, 0, "起始日期")?)?;
            let days = rest
                .get(1)
                .map(|s| s.parse::<u32>())
                .transpose()
                .map_err(|e| format!("天数格式错误: {}", e))?;
            let report = state.allocation_api.generate_draft(start, days, &operator)?;
            print_json(&report)
        }
        "approve" => {
            ensure_ids(rest)?;
            let outcomes = state.allocation_api.approve_many(rest, &operator)?;
            print_json(&outcomes)
        }
        "publish" => {
            ensure_ids(rest)?;
            let outcomes = state.allocation_api.publish_many(rest, &operator)?;
            print_json(&outcomes)
        }
        "list-day" => {
            let weekday = required(rest, 0, "星期")?;
            print_json(&state.allocation_api.list_by_day(weekday)?)
        }
        "list-invigilator" => {
            let invigilator_id = required(rest, 0, "监考员ID")?;
            let status = rest.get(1).map(String::as_str);
            print_json(
                &state
                    .allocation_api
                    .list_for_invigilator(invigilator_id, status)?,
            )
        }
        "list-range" => {
            let start = parse_date(required(rest, 0, "开始日期")?)?;
            let end = parse_date(required(rest, 1, "结束日期")?)?;
            let status = rest.get(2).map(String::as_str);
            print_json(&state.allocation_api.list_by_date_range(start, end, status)?)
        }
        "summary" => print_json(&state.dashboard_api.admin_summary()?),
        "invigilator-summary" => {
            let invigilator_id = required(rest, 0, "监考员ID")?;
            let today = chrono::Local::now().date_naive();
            print_json(
                &state
                    .dashboard_api
                    .invigilator_summary(invigilator_id, today)?,
            )
        }
        "import-invigilators" => {
            let path = required(rest, 0, "文件路径")?;
            print_json(&state.registry_api.import_invigilators(path, &operator)?)
        }
        "import-venues" => {
            let path = required(rest, 0, "文件路径")?;
            print_json(&state.registry_api.import_venues(path, &operator)?)
        }
        "actions" => {
            let limit = rest
                .first()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_ACTION_LIMIT);
            print_json(&state.dashboard_api.list_recent_actions(limit)?)
        }
        other => Err(format!("未知命令: {}\n\n{}", other, USAGE).into()),
    }
}

fn required<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str, String> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("缺少参数: {}", name))
}

fn ensure_ids(ids: &[String]) -> Result<(), String> {
    if ids.is_empty() {
        return Err("至少需要一个分配ID".to_string());
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| format!("日期格式错误 (应为 YYYY-MM-DD): {} ({})", raw, e))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
