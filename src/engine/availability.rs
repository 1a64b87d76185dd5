// ==========================================
// 周课表排课系统 - 教师空闲判定
// ==========================================
// 红线: 纯读，无记录视为空闲；不写入任何记录
// 说明: 单次生成内缓存查询结果，生成期间空闲数据视为不变
// ==========================================

use crate::domain::SchoolDay;
use crate::engine::repositories::AvailabilityStore;
use crate::repository::error::RepositoryResult;
use std::collections::HashMap;
use std::sync::Arc;

pub struct AvailabilityOracle {
    store: Arc<dyn AvailabilityStore>,
    cache: HashMap<(i64, SchoolDay, String), bool>,
}

impl AvailabilityOracle {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    pub fn is_available(&mut self, teacher_id: i64, day: SchoolDay, slot: &str) -> RepositoryResult<bool> {
        let key = (teacher_id, day, slot.to_string());
        if let Some(available) = self.cache.get(&key) {
            return Ok(*available);
        }
        let available = self.store.is_available(teacher_id, day, slot)?;
        self.cache.insert(key, available);
        Ok(available)
    }
}
