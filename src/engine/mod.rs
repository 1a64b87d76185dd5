// ==========================================
// 周课表排课系统 - 引擎层
// ==========================================
// 职责: 实现排课规则,不拼 SQL
// 红线: Engine 不拼 SQL, 不落库, 不投递通知
// ==========================================

pub mod assignment;
pub mod availability;
pub mod capability_index;
pub mod error;
pub mod events;
pub mod load_tracker;
pub mod repositories;
pub mod settings;

// 重导出核心引擎
pub use assignment::{AssignmentEngine, GenerationOutcome, GenerationRequest, RunSummary};
pub use availability::AvailabilityOracle;
pub use capability_index::CapabilityIndex;
pub use error::{EngineError, EngineResult};
pub use events::{
    dispatch_notifications, LoggingNotificationChannel, NoOpNotificationChannel,
    NotificationChannel, OptionalNotificationChannel,
};
pub use load_tracker::LoadTracker;
pub use repositories::{
    AvailabilityStore, ScheduleRepositories, StudentDirectory, TeacherDirectory, TimetableStore,
};
pub use settings::{EngineSettings, DEFAULT_HOMEROOM_LABEL, DEFAULT_LOCALE, DEFAULT_MAX_SESSIONS_PER_DAY};
