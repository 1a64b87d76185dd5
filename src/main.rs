// ==========================================
// 周课表排课系统 - 命令行入口
// ==========================================
// 用法:
//   class-timetable init
//   class-timetable generate <semester> <section> <class_teacher> [seed]
//   class-timetable publish <semester> <section>
//   class-timetable show <semester> <section> [--published]
//   class-timetable notifications <semester> <section>
//
// 数据库路径: 环境变量 TIMETABLE_DB_PATH 或用户数据目录
// 日志: RUST_LOG 过滤、TIMETABLE_LOG_FORMAT=json 切换格式（输出到 stderr）
//       命令结果以 JSON 输出到 stdout
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use class_timetable::app::{get_default_db_path, AppState};
use class_timetable::i18n::{t, t_with_args};
use class_timetable::{db, logging};
use serde_json::json;

fn main() -> Result<()> {
    // TIMETABLE_LOG_FORMAT=json 时输出单行 JSON 日志
    match std::env::var("TIMETABLE_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", t("app.usage"));
        std::process::exit(2);
    };

    let db_path = get_default_db_path();
    tracing::info!("{}", t("app.name"));
    tracing::info!("{}", t_with_args("app.version", &[("version", class_timetable::VERSION)]));
    tracing::info!("{}", t_with_args("app.database", &[("path", db_path.as_str())]));

    match command {
        "init" => {
            let conn = db::open_sqlite_connection(&db_path).with_context(|| format!("无法打开数据库: {}", db_path))?;
            db::ensure_schema(&conn)?;
            let version = db::read_schema_version(&conn)?;
            print_json(&json!({ "db_path": db_path, "schema_version": version }))?;
        }
        "generate" => {
            let semester = parse_semester(args.get(1))?;
            let section = required(args.get(2), "section")?;
            let class_teacher = required(args.get(3), "class_teacher")?;
            let seed = args
                .get(4)
                .map(|s| s.parse::<u64>().with_context(|| format!("seed 无效: {}", s)))
                .transpose()?;

            let state = open_state(db_path)?;
            let outcome = state
                .timetable_api
                .generate(semester, section, class_teacher, seed)?;
            print_json(&json!({
                "run_id": outcome.run_id,
                "summary": outcome.summary,
                "complete": outcome.summary.is_complete(),
                "entries": outcome.entries,
                "notifications": outcome.notifications,
            }))?;
        }
        "publish" => {
            let semester = parse_semester(args.get(1))?;
            let section = required(args.get(2), "section")?;

            let state = open_state(db_path)?;
            let count = state.timetable_api.publish(semester, section)?;
            print_json(&json!({ "semester": semester, "section": section, "published": count }))?;
        }
        "show" => {
            let semester = parse_semester(args.get(1))?;
            let section = required(args.get(2), "section")?;
            let published_only = args.iter().skip(3).any(|a| a == "--published");

            let state = open_state(db_path)?;
            let rows = state.timetable_api.get_timetable(semester, section, published_only)?;
            print_json(&rows)?;
        }
        "notifications" => {
            let semester = parse_semester(args.get(1))?;
            let section = required(args.get(2), "section")?;

            let state = open_state(db_path)?;
            let notifications = state.timetable_api.list_notifications(semester, section)?;
            print_json(&notifications)?;
        }
        other => {
            eprintln!("{}", t("app.usage"));
            bail!("未知命令: {}", other);
        }
    }

    Ok(())
}

fn open_state(db_path: String) -> Result<AppState> {
    AppState::new(db_path).map_err(|e| anyhow!(e))
}

fn required<'a>(arg: Option<&'a String>, name: &str) -> Result<&'a str> {
    arg.map(|s| s.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("缺少参数: {}\n{}", name, t("app.usage")))
}

fn parse_semester(arg: Option<&String>) -> Result<i32> {
    let raw = required(arg, "semester")?;
    raw.trim()
        .parse::<i32>()
        .with_context(|| format!("semester 无效: {}", raw))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
