// ==========================================
// 课表集成测试环境
// ==========================================
// 职责: 临时数据库 + 可选配置覆写 + 完整 AppState
// ==========================================

#![allow(dead_code)]

use class_timetable::api::{RosterApi, TimetableApi};
use class_timetable::app::AppState;
use class_timetable::config::ConfigManager;
use class_timetable::domain::{NewTeacher, Student};
use tempfile::NamedTempFile;

#[path = "../test_helpers.rs"]
mod test_helpers;

pub struct TimetableTestEnv {
    _temp_file: NamedTempFile,
    pub db_path: String,
    pub state: AppState,
}

impl TimetableTestEnv {
    /// 默认配置（标准网格、SINGLE_SUBJECT）
    pub fn new() -> Self {
        Self::with_config(&[])
    }

    /// 在 AppState 初始化前写入配置覆写
    pub fn with_config(overrides: &[(&str, &str)]) -> Self {
        let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");

        if !overrides.is_empty() {
            let config = ConfigManager::new(&db_path).expect("创建ConfigManager失败");
            for (key, value) in overrides {
                config.set_config_value(key, value).expect("写入配置失败");
            }
        }

        let state = AppState::new(db_path.clone()).expect("初始化AppState失败");
        Self {
            _temp_file: temp_file,
            db_path,
            state,
        }
    }

    pub fn roster(&self) -> &RosterApi {
        &self.state.roster_api
    }

    pub fn timetable(&self) -> &TimetableApi {
        &self.state.timetable_api
    }

    pub fn onboard(&self, teacher: NewTeacher) -> i64 {
        self.roster().onboard_teacher(&teacher).expect("教师入职失败")
    }

    pub fn register(&self, students: Vec<Student>) {
        for student in students {
            self.roster().register_student(&student).expect("登记学生失败");
        }
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        test_helpers::count_rows(&self.db_path, table)
    }
}
