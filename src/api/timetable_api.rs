// ==========================================
// 周课表排课系统 - 课表 API
// ==========================================
// 职责: 生成、发布、查询课表
// 流程: 校验 → 键锁 → 引擎生成 → 单事务提交（条目 + 事件日志）→ 投递通知
// 红线:
// - 提交失败时本次生成的任何内容都不可见
// - 通知投递失败不影响已提交课表
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::error::{validate_key, ApiError, ApiResult};
use crate::api::generation_lock::GenerationLocks;
use crate::domain::{ScheduleNotification, TimetableEntry, TimetableRow};
use crate::engine::events::{dispatch_notifications, OptionalNotificationChannel};
use crate::engine::repositories::{TeacherDirectory, TimetableStore};
use crate::engine::{AssignmentEngine, GenerationOutcome, GenerationRequest};
use crate::i18n::t_with_args;
use crate::repository::NotificationLogRepository;

/// 查不到教师时的显示名
const UNKNOWN_TEACHER_NAME: &str = "N/A";

// ==========================================
// TimetableApi - 课表 API
// ==========================================
pub struct TimetableApi {
    engine: Arc<AssignmentEngine>,
    store: Arc<dyn TimetableStore>,
    teachers: Arc<dyn TeacherDirectory>,
    notification_log: Arc<NotificationLogRepository>,
    channel: OptionalNotificationChannel,
    locks: GenerationLocks,
}

impl TimetableApi {
    pub fn new(
        engine: Arc<AssignmentEngine>,
        store: Arc<dyn TimetableStore>,
        teachers: Arc<dyn TeacherDirectory>,
        notification_log: Arc<NotificationLogRepository>,
        channel: OptionalNotificationChannel,
    ) -> Self {
        Self {
            engine,
            store,
            teachers,
            notification_log,
            channel,
            locks: GenerationLocks::new(),
        }
    }

    /// 生成课表草稿
    ///
    /// # 参数
    /// - `seed`: 随机种子；None 时随机生成（记录在日志中便于复现）
    ///
    /// # 返回
    /// - Ok(GenerationOutcome): 已提交的生成结果（含停课/代课通知）
    /// - Err(ApiError::UnknownTeacher / EmptyRoster): 前置条件失败，无任何写入
    /// - Err(ApiError::PersistenceError): 提交失败，已整体回滚
    pub fn generate(
        &self,
        semester: i32,
        section: &str,
        class_teacher_name: &str,
        seed: Option<u64>,
    ) -> ApiResult<GenerationOutcome> {
        validate_key(semester, section)?;
        if class_teacher_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("班主任姓名不能为空".to_string()));
        }

        let request = GenerationRequest {
            semester,
            section: section.trim().to_string(),
            class_teacher_name: class_teacher_name.trim().to_string(),
            seed: seed.unwrap_or_else(rand::random),
        };

        let outcome = self.locks.with_lock(semester, &request.section, || {
            let outcome = self.engine.generate(&request)?;
            self.store
                .replace_entries(semester, &request.section, &outcome.entries, &outcome.notifications)
                .map_err(|e| ApiError::PersistenceError(e.to_string()))?;
            Ok(outcome)
        })?;

        let semester_text = semester.to_string();
        let message = if outcome.summary.is_complete() {
            t_with_args(
                "generation.complete",
                &[("semester", semester_text.as_str()), ("section", request.section.as_str())],
            )
        } else {
            let cancelled = outcome.summary.cancelled.to_string();
            t_with_args(
                "generation.complete_with_gaps",
                &[
                    ("semester", semester_text.as_str()),
                    ("section", request.section.as_str()),
                    ("cancelled", cancelled.as_str()),
                ],
            )
        };
        tracing::info!(run_id = %outcome.run_id, seed = request.seed, "{}", message);

        let delivered = dispatch_notifications(&self.channel, &outcome.notifications);
        tracing::debug!(
            run_id = %outcome.run_id,
            delivered,
            total = outcome.notifications.len(),
            "通知投递完成"
        );

        Ok(outcome)
    }

    /// 发布课表
    ///
    /// # 返回
    /// - Ok(count): 已发布条目数
    /// - Err(ApiError::NotFound): 该键下没有任何条目
    pub fn publish(&self, semester: i32, section: &str) -> ApiResult<usize> {
        validate_key(semester, section)?;
        let section = section.trim();

        let count = self
            .locks
            .with_lock(semester, section, || Ok(self.store.mark_published(semester, section)?))?;

        let semester_text = semester.to_string();
        tracing::info!(
            count,
            "{}",
            t_with_args("publish.done", &[("semester", semester_text.as_str()), ("section", section)])
        );
        Ok(count)
    }

    /// 查询课表（按网格顺序）
    ///
    /// # 参数
    /// - `published_only`: true 时只返回已发布条目
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 无符合条件的条目
    pub fn get_timetable(&self, semester: i32, section: &str, published_only: bool) -> ApiResult<Vec<TimetableRow>> {
        validate_key(semester, section)?;
        let section = section.trim();

        let mut entries: Vec<TimetableEntry> = self
            .store
            .find_by_semester_section(semester, section)?
            .into_iter()
            .filter(|e| !published_only || e.published)
            .collect();

        if entries.is_empty() {
            return Err(ApiError::NotFound(format!(
                "课表不存在: semester={}, section={}",
                semester, section
            )));
        }

        let grid = &self.engine.settings().grid;
        entries.sort_by_key(|e| {
            (
                grid.day_position(e.day).unwrap_or(usize::MAX),
                grid.slot_position(&e.slot).unwrap_or(usize::MAX),
                e.published,
                e.seq_no,
            )
        });

        let mut names: HashMap<i64, String> = HashMap::new();
        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let teacher_name = match names.get(&entry.teacher_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .teachers
                        .find_by_id(entry.teacher_id)?
                        .map(|t| t.name)
                        .unwrap_or_else(|| UNKNOWN_TEACHER_NAME.to_string());
                    names.insert(entry.teacher_id, name.clone());
                    name
                }
            };
            rows.push(TimetableRow {
                day: entry.day,
                slot: entry.slot,
                subject: entry.subject,
                teacher_id: entry.teacher_id,
                teacher_name,
                kind: entry.kind,
                published: entry.published,
            });
        }
        Ok(rows)
    }

    /// 查询代课/停课事件日志
    pub fn list_notifications(&self, semester: i32, section: &str) -> ApiResult<Vec<ScheduleNotification>> {
        validate_key(semester, section)?;
        Ok(self
            .notification_log
            .find_by_semester_section(semester, section.trim())?)
    }

    /// 查询某次生成的事件日志
    pub fn list_notifications_for_run(&self, run_id: &str) -> ApiResult<Vec<ScheduleNotification>> {
        if run_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("run_id不能为空".to_string()));
        }
        Ok(self.notification_log.find_by_run(run_id.trim())?)
    }
}
