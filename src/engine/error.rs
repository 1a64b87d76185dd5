// ==========================================
// 周课表排课系统 - 引擎层错误类型
// ==========================================
// 说明: 前置条件失败为错误；课时排不出为停课通知，不是错误
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("班主任不存在: {name}")]
    UnknownTeacher { name: String },

    #[error("班级无学生: semester={semester}, section={section}")]
    EmptyRoster { semester: i32, section: String },

    #[error("课时网格无效: {0}")]
    InvalidGrid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type EngineResult<T> = Result<T, EngineError>;
