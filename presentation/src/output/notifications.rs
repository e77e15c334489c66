//! Terminal rendering of notifications

use colored::Colorize;
use paramlab_domain::{Notification, NotificationKind};

/// Renders notifications as one or two terminal lines each
pub struct NotificationRenderer;

impl NotificationRenderer {
    pub fn render(notification: &Notification) -> String {
        let (icon, label) = match notification.kind {
            NotificationKind::Success => ("✓".green().bold(), "success".green()),
            NotificationKind::Error => ("✗".red().bold(), "error".red()),
            NotificationKind::Warning => ("!".yellow().bold(), "warning".yellow()),
            NotificationKind::Info => ("i".blue().bold(), "info".blue()),
        };

        let mut line = match &notification.title {
            Some(title) => format!("{} {} {}", icon, title.bold(), notification.message),
            None => format!("{} {}", icon, notification.message),
        };
        if let Some(action) = &notification.action {
            line.push_str(&format!(" {}", format!("[{}]", action.label).dimmed()));
        }
        if !notification.auto_hide {
            line.push_str(&format!(" {}", format!("({})", label).dimmed()));
        }
        line
    }

    /// Render a list in order, one per line
    pub fn render_all(notifications: &[Notification]) -> String {
        notifications
            .iter()
            .map(Self::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
