// ==========================================
// 周课表排课系统 - 排课引擎
// ==========================================
// 职责: 按网格顺序遍历 (天, 课时)，为班级分配教师
// 输入: 学期/班级 + 班主任 + 随机种子
// 输出: 课表条目（草稿）+ 代课/停课通知
// ==========================================
// 红线:
// - 前置条件（班级非空、班主任存在）在任何分配之前检查
// - 引擎不落库、不投递通知；提交与投递由 API 层负责
// - 同一种子 + 同一数据 => 同一结果
// ==========================================

use crate::domain::{
    recipient_emails, EntryKind, NotificationKind, ScheduleNotification, SchoolDay,
    SlotOccupancyPolicy, Teacher, TimetableEntry,
};
use crate::engine::availability::AvailabilityOracle;
use crate::engine::capability_index::CapabilityIndex;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::load_tracker::LoadTracker;
use crate::engine::repositories::ScheduleRepositories;
use crate::engine::settings::EngineSettings;
use crate::i18n::t_with_args_in;
use crate::repository::error::RepositoryResult;
use chrono::{NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// 请求与结果
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub semester: i32,
    pub section: String,
    pub class_teacher_name: String,
    pub seed: u64,
}

/// 生成结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub homeroom: usize,
    pub matched: usize,
    pub substitute: usize,
    pub cancelled: usize,
}

impl RunSummary {
    /// 无停课即为完整课表
    pub fn is_complete(&self) -> bool {
        self.cancelled == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub run_id: String,
    pub semester: i32,
    pub section: String,
    pub entries: Vec<TimetableEntry>,
    pub notifications: Vec<ScheduleNotification>,
    pub summary: RunSummary,
}

// ==========================================
// 单次生成的可变状态
// ==========================================
struct RunState<'a> {
    request: &'a GenerationRequest,
    run_id: String,
    created_at: NaiveDateTime,
    rng: StdRng,
    oracle: AvailabilityOracle,
    loads: LoadTracker,
    occupied: HashSet<(i64, SchoolDay, String)>,
    recipients: Vec<String>,
    entries: Vec<TimetableEntry>,
    notifications: Vec<ScheduleNotification>,
    summary: RunSummary,
}

impl<'a> RunState<'a> {
    fn assign(&mut self, teacher: &Teacher, day: SchoolDay, slot: &str, subject: &str, kind: EntryKind) {
        self.loads.record(teacher.teacher_id, day);
        self.occupied.insert((teacher.teacher_id, day, slot.to_string()));
        self.entries.push(TimetableEntry {
            entry_id: Uuid::new_v4().to_string(),
            run_id: self.run_id.clone(),
            semester: self.request.semester,
            section: self.request.section.clone(),
            day,
            slot: slot.to_string(),
            seq_no: self.entries.len() as i32,
            subject: subject.to_string(),
            teacher_id: teacher.teacher_id,
            kind,
            published: false,
            created_at: self.created_at,
            published_at: None,
        });
        match kind {
            EntryKind::Homeroom => self.summary.homeroom += 1,
            EntryKind::Matched => self.summary.matched += 1,
            EntryKind::Substitute => self.summary.substitute += 1,
        }
    }

    fn emit(
        &mut self,
        kind: NotificationKind,
        day: SchoolDay,
        slot: &str,
        subject: &str,
        substitute: Option<&Teacher>,
        message: String,
    ) {
        self.notifications.push(ScheduleNotification {
            notification_id: Uuid::new_v4().to_string(),
            run_id: self.run_id.clone(),
            kind,
            semester: self.request.semester,
            section: self.request.section.clone(),
            day,
            slot: slot.to_string(),
            subject: subject.to_string(),
            substitute_teacher_id: substitute.map(|t| t.teacher_id),
            substitute_teacher_name: substitute.map(|t| t.name.clone()),
            message,
            recipients: self.recipients.clone(),
            created_at: self.created_at,
        });
    }
}

// ==========================================
// AssignmentEngine - 排课引擎
// ==========================================
pub struct AssignmentEngine {
    repos: ScheduleRepositories,
    settings: EngineSettings,
}

impl AssignmentEngine {
    pub fn new(repos: ScheduleRepositories, settings: EngineSettings) -> Self {
        Self { repos, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 生成一周课表（不落库）
    ///
    /// # 错误
    /// - `EmptyRoster`: 班级无学生
    /// - `UnknownTeacher`: 班主任姓名无法精确匹配
    /// - `Repository`: 协作方读取失败
    ///
    /// 排不出的课时以停课通知体现在结果中，不作为错误返回。
    /// 通知正文按 `EngineSettings::locale` 生成；同一种子 + 同一数据 + 同一语言 => 同一通知日志。
    #[instrument(skip(self, request), fields(
        semester = request.semester,
        section = %request.section,
        seed = request.seed,
        occupancy = %self.settings.occupancy
    ))]
    pub fn generate(&self, request: &GenerationRequest) -> EngineResult<GenerationOutcome> {
        // 1. 前置条件
        let students = self
            .repos
            .students
            .list_by_semester_section(request.semester, &request.section)?;
        if students.is_empty() {
            return Err(EngineError::EmptyRoster {
                semester: request.semester,
                section: request.section.clone(),
            });
        }

        let class_teacher = self
            .repos
            .teachers
            .find_by_name(&request.class_teacher_name)?
            .ok_or_else(|| EngineError::UnknownTeacher {
                name: request.class_teacher_name.trim().to_string(),
            })?;

        let homeroom_slot = self
            .settings
            .grid
            .homeroom_slot()
            .map(|s| s.label.clone())
            .ok_or_else(|| EngineError::InvalidGrid("课时网格没有教学课时".to_string()))?;

        // 2. 构建索引
        let roster = self.repos.teachers.all()?;
        let index = CapabilityIndex::build(request.semester, &roster, self.settings.capability_delimiter);
        let mut substitutes: Vec<Teacher> = roster.into_iter().filter(|t| t.active).collect();
        substitutes.sort_by_key(|t| t.teacher_id);

        let mut run = RunState {
            request,
            run_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().naive_utc(),
            rng: StdRng::seed_from_u64(request.seed),
            oracle: AvailabilityOracle::new(self.repos.availability.clone()),
            loads: LoadTracker::new(),
            occupied: HashSet::new(),
            recipients: recipient_emails(&students),
            entries: Vec::new(),
            notifications: Vec::new(),
            summary: RunSummary::default(),
        };

        tracing::info!(
            run_id = %run.run_id,
            class_teacher_id = class_teacher.teacher_id,
            subjects = index.subjects().len(),
            candidates = substitutes.len(),
            students = students.len(),
            "开始生成课表"
        );

        // 3. 遍历网格
        let mut slot_cursor = 0usize;
        for &day in self.settings.grid.days() {
            run.assign(&class_teacher, day, &homeroom_slot, &self.settings.homeroom_label, EntryKind::Homeroom);

            for slot in self.settings.grid.teaching_slots().skip(1) {
                match self.settings.occupancy {
                    SlotOccupancyPolicy::SingleSubject => {
                        self.fill_single_subject(&mut run, &index, &substitutes, day, &slot.label, slot_cursor)?
                    }
                    SlotOccupancyPolicy::ParallelSubjects => {
                        self.fill_parallel_subjects(&mut run, &index, &substitutes, day, &slot.label)?
                    }
                }
                slot_cursor += 1;
            }
        }

        tracing::info!(
            run_id = %run.run_id,
            homeroom = run.summary.homeroom,
            matched = run.summary.matched,
            substitute = run.summary.substitute,
            cancelled = run.summary.cancelled,
            "课表生成完成"
        );

        Ok(GenerationOutcome {
            run_id: run.run_id,
            semester: request.semester,
            section: request.section.clone(),
            entries: run.entries,
            notifications: run.notifications,
            summary: run.summary,
        })
    }

    /// 单科目占用：按轮转顺序尝试科目，首个排上的科目占用该课时
    fn fill_single_subject(
        &self,
        run: &mut RunState<'_>,
        index: &CapabilityIndex,
        substitutes: &[Teacher],
        day: SchoolDay,
        slot: &str,
        slot_cursor: usize,
    ) -> RepositoryResult<()> {
        let subjects = index.subjects();
        let n = subjects.len();
        for offset in 0..n {
            let subject = &subjects[(slot_cursor + offset) % n];
            if self.staff_subject(run, index, substitutes, day, slot, subject)? {
                return Ok(());
            }
            self.cancel(run, day, slot, subject);
        }
        Ok(())
    }

    /// 多科目并行：每个科目独立尝试同一课时
    fn fill_parallel_subjects(
        &self,
        run: &mut RunState<'_>,
        index: &CapabilityIndex,
        substitutes: &[Teacher],
        day: SchoolDay,
        slot: &str,
    ) -> RepositoryResult<()> {
        for subject in index.subjects() {
            if !self.staff_subject(run, index, substitutes, day, slot, subject)? {
                self.cancel(run, day, slot, subject);
            }
        }
        Ok(())
    }

    /// 为 (天, 课时, 科目) 找教师：先匹配，后代课
    ///
    /// # 返回
    /// - `Ok(true)`: 已写入条目（MATCHED 或 SUBSTITUTE）
    /// - `Ok(false)`: 无人可排
    fn staff_subject(
        &self,
        run: &mut RunState<'_>,
        index: &CapabilityIndex,
        substitutes: &[Teacher],
        day: SchoolDay,
        slot: &str,
        subject: &str,
    ) -> RepositoryResult<bool> {
        let mut pool: Vec<&Teacher> = index.pool(subject).iter().collect();
        pool.shuffle(&mut run.rng);
        for teacher in pool {
            if self.is_eligible(run, teacher, day, slot)? {
                tracing::debug!(
                    teacher_id = teacher.teacher_id,
                    day = %day,
                    slot,
                    subject,
                    "科目匹配"
                );
                run.assign(teacher, day, slot, subject, EntryKind::Matched);
                return Ok(true);
            }
        }

        let mut fallback: Vec<&Teacher> = substitutes.iter().collect();
        fallback.shuffle(&mut run.rng);
        for teacher in fallback {
            if self.is_eligible(run, teacher, day, slot)? {
                tracing::warn!(
                    teacher_id = teacher.teacher_id,
                    day = %day,
                    slot,
                    subject,
                    "无匹配教师，安排代课"
                );
                run.assign(teacher, day, slot, subject, EntryKind::Substitute);
                let message = t_with_args_in(
                    &self.settings.locale,
                    "notification.substitution",
                    &[
                        ("teacher", teacher.name.as_str()),
                        ("subject", subject),
                        ("day", day.as_str()),
                        ("slot", slot),
                    ],
                );
                run.emit(NotificationKind::Substitution, day, slot, subject, Some(teacher), message);
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn cancel(&self, run: &mut RunState<'_>, day: SchoolDay, slot: &str, subject: &str) {
        tracing::warn!(day = %day, slot, subject, "无教师可排，停课");
        let semester = run.request.semester.to_string();
        let message = t_with_args_in(
            &self.settings.locale,
            "notification.cancellation",
            &[
                ("subject", subject),
                ("semester", semester.as_str()),
                ("section", run.request.section.as_str()),
                ("day", day.as_str()),
                ("slot", slot),
            ],
        );
        run.emit(NotificationKind::Cancellation, day, slot, subject, None, message);
        run.summary.cancelled += 1;
    }

    /// 候选教师检查：本班该课时未占用 → 未达日上限 → 空闲
    fn is_eligible(
        &self,
        run: &mut RunState<'_>,
        teacher: &Teacher,
        day: SchoolDay,
        slot: &str,
    ) -> RepositoryResult<bool> {
        if run.occupied.contains(&(teacher.teacher_id, day, slot.to_string())) {
            return Ok(false);
        }
        let cap = teacher.effective_daily_cap(self.settings.default_max_sessions_per_day);
        if !run.loads.has_capacity(teacher.teacher_id, day, cap) {
            return Ok(false);
        }
        run.oracle.is_available(teacher.teacher_id, day, slot)
    }
}
