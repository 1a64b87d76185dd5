// ==========================================
// 周课表排课系统 - 名册管理 API
// ==========================================
// 职责: 教师入职（含空闲记录预置）、空闲管理、学生登记、站内通知查询
// ==========================================

use std::sync::Arc;

use crate::api::error::{validate_key, ApiError, ApiResult};
use crate::domain::{AvailabilityRecord, NewTeacher, SlotGrid, Student, Teacher};
use crate::engine::repositories::{StudentDirectory, TeacherDirectory};
use crate::repository::{
    AvailabilityRepository, StudentNotificationEntity, StudentNotificationRepository, StudentRepository,
    TeacherRepository,
};

pub struct RosterApi {
    teacher_repo: Arc<TeacherRepository>,
    student_repo: Arc<StudentRepository>,
    availability_repo: Arc<AvailabilityRepository>,
    student_notification_repo: Arc<StudentNotificationRepository>,
    grid: SlotGrid,
    capability_delimiter: char,
}

impl RosterApi {
    pub fn new(
        teacher_repo: Arc<TeacherRepository>,
        student_repo: Arc<StudentRepository>,
        availability_repo: Arc<AvailabilityRepository>,
        student_notification_repo: Arc<StudentNotificationRepository>,
        grid: SlotGrid,
        capability_delimiter: char,
    ) -> Self {
        Self {
            teacher_repo,
            student_repo,
            availability_repo,
            student_notification_repo,
            grid,
            capability_delimiter,
        }
    }

    /// 教师入职：写入教师并预置整周空闲记录
    ///
    /// # 返回
    /// - Ok(teacher_id)
    pub fn onboard_teacher(&self, teacher: &NewTeacher) -> ApiResult<i64> {
        if teacher.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("教师姓名不能为空".to_string()));
        }
        if let Some(semester) = teacher.semester_handling {
            if semester <= 0 {
                return Err(ApiError::InvalidInput(format!("学期必须为正数: {}", semester)));
            }
        }
        if teacher.max_sessions_per_day < 0 {
            return Err(ApiError::InvalidInput("每日课时上限不能为负".to_string()));
        }
        if let Some(bad) = teacher.subjects.iter().find(|s| s.contains(self.capability_delimiter)) {
            return Err(ApiError::InvalidInput(format!(
                "科目名不能包含分隔符 '{}': {}",
                self.capability_delimiter, bad
            )));
        }

        let teacher_id = self.teacher_repo.insert(teacher, self.capability_delimiter)?;
        let provisioned = self.availability_repo.provision_defaults(teacher_id, &self.grid)?;
        tracing::info!(teacher_id, provisioned, name = %teacher.name.trim(), "教师入职");
        Ok(teacher_id)
    }

    /// 启用/停用教师
    pub fn set_teacher_active(&self, teacher_id: i64, active: bool) -> ApiResult<()> {
        self.teacher_repo.set_active(teacher_id, active)?;
        Ok(())
    }

    /// 设置教师空闲状态
    pub fn set_availability(&self, record: &AvailabilityRecord) -> ApiResult<()> {
        if !self.grid.is_teaching(&record.slot) {
            return Err(ApiError::InvalidInput(format!("不是教学课时: {}", record.slot)));
        }
        if self.grid.day_position(record.day).is_none() {
            return Err(ApiError::InvalidInput(format!("不是教学日: {}", record.day)));
        }
        if self.teacher_repo.find_by_id(record.teacher_id)?.is_none() {
            return Err(ApiError::NotFound(format!("教师(id={})不存在", record.teacher_id)));
        }
        self.availability_repo.set_availability(record)?;
        Ok(())
    }

    pub fn get_availability(&self, teacher_id: i64) -> ApiResult<Vec<AvailabilityRecord>> {
        Ok(self.availability_repo.find_by_teacher(teacher_id)?)
    }

    /// 登记学生（按学号新增或更新）
    pub fn register_student(&self, student: &Student) -> ApiResult<()> {
        if student.usn.trim().is_empty() {
            return Err(ApiError::InvalidInput("学号不能为空".to_string()));
        }
        if student.email.trim().is_empty() {
            return Err(ApiError::InvalidInput("学生邮箱不能为空".to_string()));
        }
        validate_key(student.semester, &student.section)?;

        // 查询与生成均按去空白后的班级匹配，入库前统一规整
        let normalized = Student {
            usn: student.usn.trim().to_string(),
            name: student.name.trim().to_string(),
            email: student.email.trim().to_string(),
            department: student.department.clone(),
            semester: student.semester,
            section: student.section.trim().to_string(),
        };
        self.student_repo.upsert(&normalized)?;
        Ok(())
    }

    pub fn list_students(&self, semester: i32, section: &str) -> ApiResult<Vec<Student>> {
        validate_key(semester, section)?;
        Ok(self.student_repo.list_by_semester_section(semester, section.trim())?)
    }

    pub fn list_teachers_for_semester(&self, semester: i32) -> ApiResult<Vec<Teacher>> {
        if semester <= 0 {
            return Err(ApiError::InvalidInput(format!("学期必须为正数: {}", semester)));
        }
        Ok(self.teacher_repo.list_by_semester(semester)?)
    }

    /// 学生站内通知（最新在前）
    pub fn list_notifications_for_student(&self, email: &str) -> ApiResult<Vec<StudentNotificationEntity>> {
        if email.trim().is_empty() {
            return Err(ApiError::InvalidInput("邮箱不能为空".to_string()));
        }
        Ok(self.student_notification_repo.find_by_recipient(email.trim())?)
    }
}
