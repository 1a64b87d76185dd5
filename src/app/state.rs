// ==========================================
// 周课表排课系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{RosterApi, TimetableApi};
use crate::config::{ConfigManager, TimetableConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::{
    AssignmentEngine, EngineSettings, NotificationChannel, OptionalNotificationChannel,
    ScheduleRepositories,
};
use crate::repository::{
    AvailabilityRepository, NotificationLogRepository, StudentNotificationRepository, StudentRepository,
    TeacherRepository, TimetableRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课表API（生成/发布/查询）
    pub timetable_api: Arc<TimetableApi>,

    /// 名册API（教师/学生/空闲）
    pub roster_api: Arc<RosterApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 启动时加载的引擎参数
    pub settings: EngineSettings,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并确保表结构
    /// 2. 读取配置（引擎参数、语言）
    /// 3. 初始化Repository / Engine / API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("无法初始化表结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone()).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_engine_settings()
            .map_err(|e| format!("排课配置无效: {}", e))?;
        // 日志/命令行横幅使用全局语言；通知正文由引擎参数决定
        crate::i18n::set_locale(&settings.locale);

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let teacher_repo = Arc::new(TeacherRepository::new(conn.clone()));
        let student_repo = Arc::new(StudentRepository::new(conn.clone()));
        let availability_repo = Arc::new(AvailabilityRepository::new(conn.clone()));
        let timetable_repo = Arc::new(TimetableRepository::new(conn.clone()));
        let notification_log_repo = Arc::new(NotificationLogRepository::new(conn.clone()));
        let student_notification_repo = Arc::new(StudentNotificationRepository::new(conn));

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let repos = ScheduleRepositories::new(teacher_repo.clone(), student_repo.clone(), availability_repo.clone());
        let engine = Arc::new(AssignmentEngine::new(repos, settings.clone()));
        let channel = OptionalNotificationChannel::with_channel(
            student_notification_repo.clone() as Arc<dyn NotificationChannel>
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let timetable_api = Arc::new(TimetableApi::new(
            engine,
            timetable_repo,
            teacher_repo.clone(),
            notification_log_repo,
            channel,
        ));
        let roster_api = Arc::new(RosterApi::new(
            teacher_repo,
            student_repo,
            availability_repo,
            student_notification_repo,
            settings.grid.clone(),
            settings.capability_delimiter,
        ));

        tracing::info!(
            occupancy = %settings.occupancy,
            default_cap = settings.default_max_sessions_per_day,
            locale = %settings.locale,
            "AppState初始化完成"
        );

        Ok(Self {
            db_path,
            timetable_api,
            roster_api,
            config_manager,
            settings,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 TIMETABLE_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("TIMETABLE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./class_timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("class-timetable");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("class_timetable.db");
        }
    }

    path.to_string_lossy().to_string()
}
