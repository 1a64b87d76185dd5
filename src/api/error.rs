// ==========================================
// 周课表排课系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/Engine错误为用户友好的错误消息
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("班主任不存在: {0}")]
    UnknownTeacher(String),

    #[error("班级无学生: semester={semester}, section={section}")]
    EmptyRoster { semester: i32, section: String },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("课表持久化失败: {0}")]
    PersistenceError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => {
                ApiError::DatabaseError(format!("数据库连接失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => ApiError::PersistenceError(msg),
            RepositoryError::LockError(msg) => ApiError::LockError(format!("数据库锁获取失败: {}", msg)),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownTeacher { name } => ApiError::UnknownTeacher(name),
            EngineError::EmptyRoster { semester, section } => ApiError::EmptyRoster { semester, section },
            EngineError::InvalidGrid(msg) => ApiError::ValidationError(msg),
            EngineError::Repository(err) => ApiError::from(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 校验学期与班级参数
pub(crate) fn validate_key(semester: i32, section: &str) -> ApiResult<()> {
    if semester <= 0 {
        return Err(ApiError::InvalidInput(format!("学期必须为正数: {}", semester)));
    }
    if section.trim().is_empty() {
        return Err(ApiError::InvalidInput("班级不能为空".to_string()));
    }
    Ok(())
}
