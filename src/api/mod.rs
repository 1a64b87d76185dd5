// ==========================================
// 周课表排课系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行及上层调用
// ==========================================

pub mod error;
pub mod generation_lock;
pub mod roster_api;
pub mod timetable_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use generation_lock::GenerationLocks;
pub use roster_api::RosterApi;
pub use timetable_api::TimetableApi;
