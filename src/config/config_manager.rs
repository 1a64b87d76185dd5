// ==========================================
// 周课表排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::timetable_config_trait::TimetableConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::{SchoolDay, SlotGrid, SlotOccupancyPolicy, TimeSlot, DEFAULT_CAPABILITY_DELIMITER};
use crate::engine::settings::{DEFAULT_HOMEROOM_LABEL, DEFAULT_LOCALE, DEFAULT_MAX_SESSIONS_PER_DAY};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

/// slot_grid 配置的 JSON 结构
///
/// 示例: {"days": ["Monday"], "slots": [{"label": "8:30-9:30", "kind": "TEACHING"}]}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotGridConfig {
    pub days: Vec<SchoolDay>,
    pub slots: Vec<TimeSlot>,
}

impl SlotGridConfig {
    pub fn into_grid(self) -> Result<SlotGrid, String> {
        SlotGrid::new(self.days, self.slots)
    }
}

impl From<&SlotGrid> for SlotGridConfig {
    fn from(grid: &SlotGrid) -> Self {
        Self {
            days: grid.days().to_vec(),
            slots: grid.slots().to_vec(),
        }
    }
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

impl TimetableConfigReader for ConfigManager {
    fn get_default_max_sessions_per_day(&self) -> Result<u32, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::DEFAULT_MAX_SESSIONS_PER_DAY,
            &DEFAULT_MAX_SESSIONS_PER_DAY.to_string(),
        )?;
        let cap: u32 = value
            .trim()
            .parse()
            .map_err(|e| format!("{} 配置无效 ({}): {}", config_keys::DEFAULT_MAX_SESSIONS_PER_DAY, value, e))?;
        if cap == 0 {
            return Err(format!("{} 必须大于 0", config_keys::DEFAULT_MAX_SESSIONS_PER_DAY).into());
        }
        Ok(cap)
    }

    fn get_homeroom_subject_label(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::HOMEROOM_SUBJECT_LABEL, DEFAULT_HOMEROOM_LABEL)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(DEFAULT_HOMEROOM_LABEL.to_string());
        }
        Ok(trimmed.to_string())
    }

    fn get_slot_occupancy_policy(&self) -> Result<SlotOccupancyPolicy, Box<dyn Error>> {
        match self.get_config_value(config_keys::SLOT_OCCUPANCY_POLICY)? {
            Some(value) => Ok(value.parse::<SlotOccupancyPolicy>()?),
            None => Ok(SlotOccupancyPolicy::default()),
        }
    }

    fn get_capability_delimiter(&self) -> Result<char, Box<dyn Error>> {
        let Some(value) = self.get_config_value(config_keys::CAPABILITY_DELIMITER)? else {
            return Ok(DEFAULT_CAPABILITY_DELIMITER);
        };
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("{} 必须是单个字符: {:?}", config_keys::CAPABILITY_DELIMITER, value).into()),
        }
    }

    fn get_slot_grid(&self) -> Result<SlotGrid, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(config_keys::SLOT_GRID)? else {
            return Ok(SlotGrid::standard());
        };
        let parsed: SlotGridConfig = serde_json::from_str(&raw)?;
        Ok(parsed.into_grid()?)
    }

    fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(DEFAULT_LOCALE.to_string());
        }
        Ok(trimmed.to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 负荷
    pub const DEFAULT_MAX_SESSIONS_PER_DAY: &str = "default_max_sessions_per_day";

    // 班主任课
    pub const HOMEROOM_SUBJECT_LABEL: &str = "homeroom_subject_label";

    // 课时占用策略: SINGLE_SUBJECT / PARALLEL_SUBJECTS
    pub const SLOT_OCCUPANCY_POLICY: &str = "slot_occupancy_policy";

    // 科目列表分隔符（单字符）
    pub const CAPABILITY_DELIMITER: &str = "capability_delimiter";

    // 课时网格 (JSON)
    pub const SLOT_GRID: &str = "slot_grid";

    // 语言
    pub const LOCALE: &str = "locale";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_without_rows() {
        let config = setup();
        let settings = config.load_engine_settings().unwrap();
        assert_eq!(settings.default_max_sessions_per_day, 4);
        assert_eq!(settings.homeroom_label, "Class Teacher");
        assert_eq!(settings.occupancy, SlotOccupancyPolicy::SingleSubject);
        assert_eq!(settings.capability_delimiter, ',');
        assert_eq!(settings.grid, SlotGrid::standard());
        assert_eq!(settings.locale, "en");
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = setup();
        config.set_config_value(config_keys::DEFAULT_MAX_SESSIONS_PER_DAY, "6").unwrap();
        config.set_config_value(config_keys::SLOT_OCCUPANCY_POLICY, "parallel_subjects").unwrap();
        config.set_config_value(config_keys::CAPABILITY_DELIMITER, ";").unwrap();
        config.set_config_value(config_keys::HOMEROOM_SUBJECT_LABEL, "Mentoring").unwrap();
        config.set_config_value(config_keys::LOCALE, "zh-CN").unwrap();

        let settings = config.load_engine_settings().unwrap();
        assert_eq!(settings.default_max_sessions_per_day, 6);
        assert_eq!(settings.occupancy, SlotOccupancyPolicy::ParallelSubjects);
        assert_eq!(settings.capability_delimiter, ';');
        assert_eq!(settings.homeroom_label, "Mentoring");
        assert_eq!(settings.locale, "zh-CN");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = setup();
        config.set_config_value(config_keys::DEFAULT_MAX_SESSIONS_PER_DAY, "0").unwrap();
        assert!(config.get_default_max_sessions_per_day().is_err());

        config.set_config_value(config_keys::CAPABILITY_DELIMITER, ",;").unwrap();
        assert!(config.get_capability_delimiter().is_err());

        config.set_config_value(config_keys::SLOT_OCCUPANCY_POLICY, "ANY").unwrap();
        assert!(config.get_slot_occupancy_policy().is_err());
    }

    #[test]
    fn test_slot_grid_json_is_validated() {
        let config = setup();
        let grid = SlotGrid::new(
            vec![SchoolDay::Monday, SchoolDay::Wednesday],
            vec![TimeSlot::teaching("9:00-10:00"), TimeSlot::teaching("10:00-11:00")],
        )
        .unwrap();
        let raw = serde_json::to_string(&SlotGridConfig::from(&grid)).unwrap();
        config.set_config_value(config_keys::SLOT_GRID, &raw).unwrap();
        assert_eq!(config.get_slot_grid().unwrap(), grid);

        config
            .set_config_value(
                config_keys::SLOT_GRID,
                r#"{"days": ["Monday"], "slots": [{"label": "lunch", "kind": "LUNCH"}]}"#,
            )
            .unwrap();
        assert!(config.get_slot_grid().is_err());
    }

    #[test]
    fn test_snapshot_and_restore() {
        let config = setup();
        config.set_config_value(config_keys::LOCALE, "zh-CN").unwrap();
        config.set_config_value(config_keys::DEFAULT_MAX_SESSIONS_PER_DAY, "5").unwrap();
        let snapshot = config.get_config_snapshot().unwrap();

        let other = setup();
        assert_eq!(other.restore_config_from_snapshot(&snapshot).unwrap(), 2);
        assert_eq!(other.get_locale().unwrap(), "zh-CN");
        assert_eq!(other.get_default_max_sessions_per_day().unwrap(), 5);
    }
}
