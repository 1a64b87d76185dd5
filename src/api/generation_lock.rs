// ==========================================
// 周课表排课系统 - 按 (学期, 班级) 串行化生成/发布
// ==========================================
// 红线: 同一键的生成与发布必须串行；不同键互不阻塞
// 说明: 注册表只持有 Weak，无人持锁时条目可被清理
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

type LockKey = (i32, String);

#[derive(Default)]
pub struct GenerationLocks {
    locks: Mutex<HashMap<LockKey, Weak<Mutex<()>>>>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取 (或创建) 键对应的锁；注册表锁只在此期间持有
    fn lock_for(&self, semester: i32, section: &str) -> ApiResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| ApiError::LockError(format!("生成锁注册表: {}", e)))?;
        let key = (semester, section.to_string());
        if let Some(existing) = locks.get(&key).and_then(Weak::upgrade) {
            return Ok(existing);
        }
        let created = Arc::new(Mutex::new(()));
        locks.insert(key, Arc::downgrade(&created));
        Ok(created)
    }

    /// 在键锁内执行
    pub fn with_lock<T>(&self, semester: i32, section: &str, f: impl FnOnce() -> ApiResult<T>) -> ApiResult<T> {
        let lock = self.lock_for(semester, section)?;
        let result = {
            let _guard = lock
                .lock()
                .map_err(|e| ApiError::LockError(format!("semester={}, section={}: {}", semester, section, e)))?;
            f()
        };
        drop(lock);
        self.cleanup();
        result
    }

    /// 清理无人持有的条目
    fn cleanup(&self) {
        if let Ok(mut locks) = self.locks.lock() {
            locks.retain(|_, w| w.upgrade().is_some());
        }
    }

    /// 当前注册的键数量
    pub fn registered(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}
