// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transient user-facing notices.
//!
//! Workflows push a notice for every outcome the user must see; the browser
//! shell drains them from `GET /v1/notices` and shows them as toasts.

use std::{collections::VecDeque, sync::Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A single toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Notices kept while nobody drains the board.
pub const MAX_PENDING_NOTICES: usize = 50;

/// Pending notices, oldest first. Past [`MAX_PENDING_NOTICES`] the oldest
/// are dropped.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    pending: Mutex<VecDeque<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        let mut pending = self.lock();
        if pending.len() == MAX_PENDING_NOTICES {
            pending.pop_front();
        }
        pending.push_back(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Remove and return every pending notice.
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notice>> {
        // A panic while holding the lock cannot leave a Vec half-pushed.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_board_in_order() {
        let board = NoticeBoard::new();
        board.info("first");
        board.error("second");

        let drained = board.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].level, NoticeLevel::Error);
        assert!(board.drain().is_empty());
    }

    #[test]
    fn undrained_board_keeps_only_the_newest() {
        let board = NoticeBoard::new();
        for i in 0..MAX_PENDING_NOTICES + 5 {
            board.error(format!("failure {i}"));
        }

        let drained = board.drain();
        assert_eq!(drained.len(), MAX_PENDING_NOTICES);
        assert_eq!(drained[0].message, "failure 5");
        assert_eq!(
            drained.last().unwrap().message,
            format!("failure {}", MAX_PENDING_NOTICES + 4)
        );
    }

    #[test]
    fn levels_serialize_lowercase() {
        let json = serde_json::to_string(&NoticeLevel::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }
}
