//! Ports to the user interface: yes/no confirmation and notifications.

use serde::{Deserialize, Serialize};

/// An action that needs the user's explicit go-ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmRequest {
    /// Replacing the tree would throw away unsaved edits.
    DiscardUnsavedChanges,
    /// The tree has warnings but no errors.
    SaveWithWarnings { warnings: usize },
    ExportWithWarnings { warnings: usize },
}

impl ConfirmRequest {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmRequest::DiscardUnsavedChanges => {
                "You have unsaved changes. Discard them?".to_owned()
            }
            ConfirmRequest::SaveWithWarnings { warnings } => {
                format!("The dialog has {warnings} warning(s). Save anyway?")
            }
            ConfirmRequest::ExportWithWarnings { warnings } => {
                format!("The dialog has {warnings} warning(s). Export anyway?")
            }
        }
    }
}

/// Asks the user a yes/no question.
pub trait ConfirmPort {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

impl<F> ConfirmPort for F
where
    F: Fn(&ConfirmRequest) -> bool,
{
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Confirms everything. For headless tools and scripted conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmPort for AutoConfirm {
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        log::debug!("persistence: auto-confirmed \"{}\"", request.prompt());
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message about a load, save, or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives notices for display.
pub trait NotificationSink {
    fn notify(&self, notice: Notice);
}

impl<F> NotificationSink for F
where
    F: Fn(Notice),
{
    fn notify(&self, notice: Notice) {
        self(notice)
    }
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => log::info!("{}", notice.message),
            NoticeLevel::Error => log::warn!("{}", notice.message),
        }
    }
}
