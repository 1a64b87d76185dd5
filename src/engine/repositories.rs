// ==========================================
// 周课表排课系统 - 引擎层协作方接口
// ==========================================
// 职责: 定义排课引擎读取/写入的外部协作方 trait，并聚合为一个依赖集合
// 说明: Engine 层定义 trait，Repository 层提供 SQLite 实现（依赖倒置）
// ==========================================

use std::sync::Arc;

use crate::domain::{ScheduleNotification, SchoolDay, Student, Teacher, TimetableEntry};
use crate::repository::error::RepositoryResult;

/// 教师名册
pub trait TeacherDirectory: Send + Sync {
    /// 负责指定学期的教师
    fn list_by_semester(&self, semester: i32) -> RepositoryResult<Vec<Teacher>>;

    /// 按姓名精确查找（同名时取 teacher_id 最小者）
    fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Teacher>>;

    fn find_by_id(&self, teacher_id: i64) -> RepositoryResult<Option<Teacher>>;

    /// 全部教师（按 teacher_id 升序）
    fn all(&self) -> RepositoryResult<Vec<Teacher>>;
}

/// 教师空闲查询
///
/// # 红线
/// - 纯读；无记录时返回 true
/// - 不得在查询中补建默认记录（预置记录见 `AvailabilityRepository::provision_defaults`）
pub trait AvailabilityStore: Send + Sync {
    fn is_available(&self, teacher_id: i64, day: SchoolDay, slot: &str) -> RepositoryResult<bool>;
}

/// 学生名册
pub trait StudentDirectory: Send + Sync {
    fn list_by_semester_section(&self, semester: i32, section: &str) -> RepositoryResult<Vec<Student>>;
}

/// 课表存储
pub trait TimetableStore: Send + Sync {
    /// 在同一事务中：删除该 (学期, 班级) 的全部草稿条目 → 写入新条目 → 追加事件日志
    ///
    /// # 返回
    /// - `Ok(count)`: 写入的条目数
    /// - `Err`: 任一步失败则整体回滚
    fn replace_entries(
        &self,
        semester: i32,
        section: &str,
        entries: &[TimetableEntry],
        notifications: &[ScheduleNotification],
    ) -> RepositoryResult<usize>;

    /// 该 (学期, 班级) 的全部条目（已发布在后，批次内按 seq_no）
    fn find_by_semester_section(&self, semester: i32, section: &str) -> RepositoryResult<Vec<TimetableEntry>>;

    /// 原子发布
    ///
    /// # 返回
    /// - `Ok(count)`: 发布后处于已发布状态的条目数
    /// - `Err(NotFound)`: 该键下没有任何条目
    fn mark_published(&self, semester: i32, section: &str) -> RepositoryResult<usize>;
}

/// 排课引擎读取的协作方集合
///
/// 将三个只读协作方合并为一个结构体参数，便于在测试中整体替换。
#[derive(Clone)]
pub struct ScheduleRepositories {
    pub teachers: Arc<dyn TeacherDirectory>,
    pub students: Arc<dyn StudentDirectory>,
    pub availability: Arc<dyn AvailabilityStore>,
}

impl ScheduleRepositories {
    pub fn new(
        teachers: Arc<dyn TeacherDirectory>,
        students: Arc<dyn StudentDirectory>,
        availability: Arc<dyn AvailabilityStore>,
    ) -> Self {
        Self {
            teachers,
            students,
            availability,
        }
    }
}
