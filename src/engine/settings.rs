// ==========================================
// 周课表排课系统 - 引擎参数
// ==========================================
// 来源: ConfigManager（config_kv）或任意 TimetableConfigReader 实现
// ==========================================

use crate::domain::{SlotGrid, SlotOccupancyPolicy, DEFAULT_CAPABILITY_DELIMITER};
use serde::{Deserialize, Serialize};

/// 教师未设置上限时的每日课时上限
pub const DEFAULT_MAX_SESSIONS_PER_DAY: u32 = 4;

/// 班主任课显示的科目名
pub const DEFAULT_HOMEROOM_LABEL: &str = "Class Teacher";

/// 通知正文语言
pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub grid: SlotGrid,
    pub default_max_sessions_per_day: u32,
    pub homeroom_label: String,
    pub occupancy: SlotOccupancyPolicy,
    pub capability_delimiter: char,
    pub locale: String, // 通知正文语言，与进程全局语言无关
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            grid: SlotGrid::standard(),
            default_max_sessions_per_day: DEFAULT_MAX_SESSIONS_PER_DAY,
            homeroom_label: DEFAULT_HOMEROOM_LABEL.to_string(),
            occupancy: SlotOccupancyPolicy::default(),
            capability_delimiter: DEFAULT_CAPABILITY_DELIMITER,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn with_grid(mut self, grid: SlotGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_occupancy(mut self, occupancy: SlotOccupancyPolicy) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }
}
