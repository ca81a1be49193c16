use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const DISABLE_ENV_VAR: &str = "TODOLIST_DISABLE_NOTIFICATIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Added,
    Updated,
    StatusUpdated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        let message = match kind {
            NoticeKind::Added => "Task added",
            NoticeKind::Updated => "Task updated",
            NoticeKind::StatusUpdated => "Task status updated",
            NoticeKind::Deleted => "Task deleted",
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }

    pub fn level(&self) -> NoticeLevel {
        match self.kind {
            NoticeKind::Added | NoticeKind::Updated => NoticeLevel::Success,
            NoticeKind::StatusUpdated => NoticeLevel::Info,
            NoticeKind::Deleted => NoticeLevel::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level().label(), self.message)
    }
}

/// Receives fire-and-forget notices; callers never act on the result beyond logging.
pub trait Notifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        eprintln!("{notice}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    #[default]
    Console,
    Desktop,
    Off,
}

impl NotificationMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "console" | "stderr" => Some(Self::Console),
            "desktop" | "system" => Some(Self::Desktop),
            "off" | "none" | "disabled" => Some(Self::Off),
            _ => None,
        }
    }
}

pub fn notifier_for(mode: NotificationMode) -> Box<dyn Notifier> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Box::new(NoopNotifier);
    }

    match mode {
        NotificationMode::Console => Box::new(ConsoleNotifier),
        NotificationMode::Off => Box::new(NoopNotifier),
        NotificationMode::Desktop => match platform_notifier() {
            Ok(notifier) => notifier,
            Err(err) => {
                log::warn!("desktop notifications unavailable, using console: {err}");
                Box::new(ConsoleNotifier)
            }
        },
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::{Notice, NoticeKind, NoticeLevel, NotificationMode};

    #[test]
    fn notice_levels_follow_kind() {
        assert_eq!(Notice::new(NoticeKind::Added).level(), NoticeLevel::Success);
        assert_eq!(Notice::new(NoticeKind::Updated).level(), NoticeLevel::Success);
        assert_eq!(
            Notice::new(NoticeKind::StatusUpdated).level(),
            NoticeLevel::Info
        );
        assert_eq!(Notice::new(NoticeKind::Deleted).level(), NoticeLevel::Error);
    }

    #[test]
    fn notice_display_includes_level() {
        let notice = Notice::new(NoticeKind::Deleted);
        assert_eq!(notice.to_string(), "[error] Task deleted");
    }

    #[test]
    fn notification_mode_parses_aliases() {
        assert_eq!(
            NotificationMode::parse("Desktop"),
            Some(NotificationMode::Desktop)
        );
        assert_eq!(NotificationMode::parse(" none "), Some(NotificationMode::Off));
        assert_eq!(NotificationMode::parse("loud"), None);
    }
}
