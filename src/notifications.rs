//! Transient user notifications
//!
//! Operation outcomes (model switched, chat send failed, export written) are
//! reported through a [`Notifier`]. The terminal implementation prints a
//! colored line; [`MemoryNotifier`] records notifications so tests and
//! embedding code can inspect them.

use colored::Colorize;
use std::fmt;
use std::sync::Mutex;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation completed
    Success,
    /// Informational message
    Info,
    /// Operation failed and was abandoned
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Short heading
    pub title: String,
    /// Body text
    pub message: String,
}

impl Notification {
    /// Create a success notification
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Create an informational notification
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Create an error notification
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Sink for notifications
pub trait Notifier: Send + Sync {
    /// Deliver a notification; must not fail
    fn notify(&self, notification: Notification);
}

/// Prints notifications to the terminal
///
/// Errors go to stderr in red, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let line = format!("{}: {}", notification.title, notification.message);
        match notification.level {
            NotificationLevel::Success => println!("{}", line.green()),
            NotificationLevel::Info => println!("{}", line.cyan()),
            NotificationLevel::Error => eprintln!("{}", line.red()),
        }
    }
}

/// Records notifications in memory
///
/// # Examples
///
/// ```
/// use turbopech::notifications::{MemoryNotifier, Notification, Notifier};
///
/// let notifier = MemoryNotifier::default();
/// notifier.notify(Notification::success("Model loaded", "phi.gguf"));
/// assert_eq!(notifier.take().len(), 1);
/// assert!(notifier.take().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    received: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// Drain and return everything received so far
    pub fn take(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|mut received| std::mem::take(&mut *received))
            .unwrap_or_default()
    }

    /// Copy of everything received so far
    pub fn snapshot(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(
            "notification [{}] {}: {}",
            notification.level,
            notification.title,
            notification.message
        );
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}
