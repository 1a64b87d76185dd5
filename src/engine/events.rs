// ==========================================
// 周课表排课系统 - 引擎层通知通道
// ==========================================
// 职责: 定义代课/停课通知的投递 trait，实现依赖倒置
// 说明: Engine 层只收集通知；提交成功后由 API 层调用通道投递
// 红线: 投递失败只记日志，不得影响已提交的课表
// ==========================================

use crate::domain::ScheduleNotification;
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 通知通道 Trait
// ==========================================

/// 通知投递通道
///
/// # 实现说明
/// - `StudentNotificationRepository` 将每个收件人写入站内通知表
/// - 邮件等外部通道可按同一接口接入
pub trait NotificationChannel: Send + Sync {
    /// 投递一条通知
    ///
    /// # 参数
    /// - `message`: 通知正文（已本地化）
    /// - `recipients`: 收件人邮箱列表
    fn notify(&self, message: &str, recipients: &[String]) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作通道（单元测试等不需要投递的场景）
#[derive(Debug, Clone, Default)]
pub struct NoOpNotificationChannel;

impl NotificationChannel for NoOpNotificationChannel {
    fn notify(&self, message: &str, recipients: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpNotificationChannel: 跳过通知投递 - recipients={}, message={}",
            recipients.len(),
            message
        );
        Ok(())
    }
}

/// 仅写日志的通道
#[derive(Debug, Clone, Default)]
pub struct LoggingNotificationChannel;

impl NotificationChannel for LoggingNotificationChannel {
    fn notify(&self, message: &str, recipients: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::info!(recipients = recipients.len(), "通知: {}", message);
        Ok(())
    }
}

/// 可选的通知通道包装
///
/// 简化 Option<Arc<dyn NotificationChannel>> 的使用
#[derive(Clone)]
pub struct OptionalNotificationChannel {
    inner: Option<Arc<dyn NotificationChannel>>,
}

impl OptionalNotificationChannel {
    pub fn with_channel(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { inner: Some(channel) }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn notify(&self, message: &str, recipients: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(channel) => channel.notify(message, recipients),
            None => {
                tracing::debug!("OptionalNotificationChannel: 未配置通道，跳过通知");
                Ok(())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalNotificationChannel {
    fn default() -> Self {
        Self::none()
    }
}

/// 逐条投递通知（尽力而为）
///
/// # 返回
/// 成功投递的条数；失败条目记 warn 日志后跳过
pub fn dispatch_notifications(
    channel: &OptionalNotificationChannel,
    notifications: &[ScheduleNotification],
) -> usize {
    let mut delivered = 0;
    for notification in notifications {
        if notification.recipients.is_empty() {
            tracing::debug!(
                notification_id = %notification.notification_id,
                "通知无收件人，跳过投递"
            );
            continue;
        }
        match channel.notify(&notification.message, &notification.recipients) {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(
                    notification_id = %notification.notification_id,
                    kind = %notification.kind,
                    error = %e,
                    "通知投递失败，已忽略"
                );
            }
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationKind, SchoolDay};
    use chrono::Utc;
    use std::sync::Mutex;

    struct RecordingChannel {
        sent: Mutex<Vec<(String, usize)>>,
        fail_on: Option<String>,
    }

    impl NotificationChannel for RecordingChannel {
        fn notify(&self, message: &str, recipients: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
            if self.fail_on.as_deref() == Some(message) {
                return Err("smtp unavailable".into());
            }
            self.sent.lock().unwrap().push((message.to_string(), recipients.len()));
            Ok(())
        }
    }

    fn notification(message: &str, recipients: &[&str]) -> ScheduleNotification {
        ScheduleNotification {
            notification_id: message.to_string(),
            run_id: "run".to_string(),
            kind: NotificationKind::Cancellation,
            semester: 3,
            section: "A".to_string(),
            day: SchoolDay::Monday,
            slot: "9:30-10:30".to_string(),
            subject: "Math".to_string(),
            substitute_teacher_id: None,
            substitute_teacher_name: None,
            message: message.to_string(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_optional_channel_none() {
        let channel = OptionalNotificationChannel::none();
        assert!(!channel.is_configured());
        assert!(channel.notify("hello", &["a@x".to_string()]).is_ok());
    }

    #[test]
    fn test_dispatch_swallows_failures() {
        let recording = Arc::new(RecordingChannel {
            sent: Mutex::new(Vec::new()),
            fail_on: Some("second".to_string()),
        });
        let channel = OptionalNotificationChannel::with_channel(recording.clone());

        let delivered = dispatch_notifications(
            &channel,
            &[
                notification("first", &["a@x", "b@x"]),
                notification("second", &["a@x"]),
                notification("third", &[]),
                notification("fourth", &["c@x"]),
            ],
        );

        assert_eq!(delivered, 2);
        let sent = recording.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), &[("first".to_string(), 2), ("fourth".to_string(), 1)]);
    }

    #[test]
    fn test_noop_and_logging_channels_succeed() {
        let recipients = vec!["a@x".to_string()];
        assert!(NoOpNotificationChannel.notify("m", &recipients).is_ok());
        assert!(LoggingNotificationChannel.notify("m", &recipients).is_ok());
    }
}
