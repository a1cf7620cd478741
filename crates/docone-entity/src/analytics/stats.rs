//! Aggregate viewing statistics.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::view::DocumentView;

/// Aggregates over a set of viewing sessions, with the sessions themselves
/// newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewStats {
    /// Number of sessions.
    pub total_views: i64,
    /// Distinct non-null viewer emails.
    pub unique_viewers: i64,
    /// Mean reported duration in whole seconds over sessions with a
    /// positive duration; zero when there are none.
    pub avg_duration: i64,
    /// The sessions, newest first.
    pub views: Vec<DocumentView>,
}

impl ViewStats {
    /// Zero-valued statistics.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute statistics from a list of sessions.
    pub fn from_views(mut views: Vec<DocumentView>) -> Self {
        views.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        let unique_viewers = views
            .iter()
            .filter_map(|v| v.viewer_email.as_deref())
            .collect::<HashSet<_>>()
            .len() as i64;

        let durations: Vec<i64> = views
            .iter()
            .filter_map(|v| v.duration_seconds)
            .filter(|d| *d > 0)
            .map(i64::from)
            .collect();
        let avg_duration = if durations.is_empty() {
            0
        } else {
            durations.iter().sum::<i64>() / durations.len() as i64
        };

        Self {
            total_views: views.len() as i64,
            unique_viewers,
            avg_duration,
            views,
        }
    }
}
