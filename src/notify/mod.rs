/*
 * User-facing notices (toast equivalents)
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            timestamp: Utc::now(),
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Info)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Success)
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Destructive)
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Keeps the most recent notices in memory so clients can poll them.
pub struct NoticeBoard {
    capacity: usize,
    notices: Mutex<VecDeque<Notice>>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(50)
    }
}

impl NoticeBoard {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            notices: Mutex::new(VecDeque::new()),
        }
    }

    #[must_use]
    pub fn recent(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.recent().into_iter().map(|n| n.title).collect()
    }
}

impl NotificationSink for NoticeBoard {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Destructive => warn!("{}: {}", notice.title, notice.description),
            _ => info!("{}: {}", notice.title, notice.description),
        }
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        if notices.len() == self.capacity {
            notices.pop_front();
        }
        notices.push_back(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_drops_oldest_past_capacity() {
        let board = NoticeBoard::new(2);
        board.notify(Notice::info("one", ""));
        board.notify(Notice::info("two", ""));
        board.notify(Notice::destructive("three", ""));
        assert_eq!(board.titles(), ["two", "three"]);
        assert_eq!(board.recent()[1].severity, Severity::Destructive);
    }
}
