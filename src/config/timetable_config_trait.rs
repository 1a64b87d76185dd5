// ==========================================
// 周课表排课系统 - 排课配置读取 Trait
// ==========================================
// 职责: 定义排课引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::{SlotGrid, SlotOccupancyPolicy};
use crate::engine::settings::EngineSettings;
use std::error::Error;

// ==========================================
// TimetableConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait TimetableConfigReader: Send + Sync {
    /// 教师未设置上限时的每日课时上限
    ///
    /// # 默认值
    /// - 4
    fn get_default_max_sessions_per_day(&self) -> Result<u32, Box<dyn Error>>;

    /// 班主任课显示的科目名
    ///
    /// # 默认值
    /// - "Class Teacher"
    fn get_homeroom_subject_label(&self) -> Result<String, Box<dyn Error>>;

    /// 课时占用策略
    ///
    /// # 默认值
    /// - SINGLE_SUBJECT
    fn get_slot_occupancy_policy(&self) -> Result<SlotOccupancyPolicy, Box<dyn Error>>;

    /// 科目列表分隔符
    ///
    /// # 默认值
    /// - ','
    fn get_capability_delimiter(&self) -> Result<char, Box<dyn Error>>;

    /// 课时网格（JSON 配置，加载时校验）
    ///
    /// # 默认值
    /// - 标准网格（周一至周五，9 个课时）
    fn get_slot_grid(&self) -> Result<SlotGrid, Box<dyn Error>>;

    /// 界面/通知语言
    ///
    /// # 默认值
    /// - "en"
    fn get_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 汇总为引擎参数
    fn load_engine_settings(&self) -> Result<EngineSettings, Box<dyn Error>> {
        Ok(EngineSettings {
            grid: self.get_slot_grid()?,
            default_max_sessions_per_day: self.get_default_max_sessions_per_day()?,
            homeroom_label: self.get_homeroom_subject_label()?,
            occupancy: self.get_slot_occupancy_policy()?,
            capability_delimiter: self.get_capability_delimiter()?,
            locale: self.get_locale()?,
        })
    }
}
