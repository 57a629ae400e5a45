use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::UserId;
use crate::model::session::{InterviewSession, SessionStatus};
use crate::model::stats;

/// Score threshold above which a topic counts as mastered.
const MASTERED_THRESHOLD: f64 = 80.0;
/// Score threshold below which a topic needs more practice.
const NEEDS_PRACTICE_THRESHOLD: f64 = 60.0;
/// Number of recent session scores kept in the trend window.
const TREND_WINDOW: usize = 10;

/// Durable per-user rollup of performance across completed sessions.
///
/// Exclusively derived data: rebuilt wholesale from the session history,
/// never hand-edited. The session records are the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: UserId,
    pub total_sessions: u32,
    pub completed_sessions: u32,
    pub total_questions_answered: u32,
    pub total_time_spent_hours: f64,
    pub average_score: Option<f64>,
    pub best_score: Option<f64>,
    pub worst_score: Option<f64>,
    pub technical_average: Option<f64>,
    pub behavioral_average: Option<f64>,
    /// Percent change of the second half of the score history against the
    /// first half. Zero below two completed sessions.
    pub improvement_rate: f64,
    /// Per-session average scores, chronological, last ten.
    pub score_trend: Vec<f64>,
    pub top_strengths: Vec<String>,
    pub top_weaknesses: Vec<String>,
    pub mastered_topics: Vec<String>,
    pub needs_practice: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    /// The empty rollup for a user with no session history.
    #[must_use]
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_sessions: 0,
            completed_sessions: 0,
            total_questions_answered: 0,
            total_time_spent_hours: 0.0,
            average_score: None,
            best_score: None,
            worst_score: None,
            technical_average: None,
            behavioral_average: None,
            improvement_rate: 0.0,
            score_trend: Vec::new(),
            top_strengths: Vec::new(),
            top_weaknesses: Vec::new(),
            mastered_topics: Vec::new(),
            needs_practice: Vec::new(),
            updated_at: now,
        }
    }

    /// Rebuilds the rollup from the user's full session history.
    ///
    /// Aggregates cover completed sessions only; `total_sessions` counts every
    /// session handed in. The slice does not need to be pre-sorted.
    #[must_use]
    pub fn from_sessions(
        user_id: UserId,
        sessions: &[InterviewSession],
        now: DateTime<Utc>,
    ) -> Self {
        let mut completed: Vec<&InterviewSession> = sessions
            .iter()
            .filter(|s| s.status() == SessionStatus::Completed)
            .collect();
        completed.sort_by_key(|s| s.created_at());

        let session_scores: Vec<f64> = completed
            .iter()
            .filter_map(|s| s.average_score())
            .collect();
        let technical: Vec<f64> = completed
            .iter()
            .filter_map(|s| s.technical_score())
            .collect();
        let behavioral: Vec<f64> = completed
            .iter()
            .filter_map(|s| s.behavioral_score())
            .collect();

        let total_seconds: u64 = completed.iter().map(|s| s.total_duration_seconds()).sum();
        #[allow(clippy::cast_precision_loss)]
        let total_time_spent_hours = total_seconds as f64 / 3600.0;

        let score_trend: Vec<f64> = session_scores
            .iter()
            .rev()
            .take(TREND_WINDOW)
            .rev()
            .copied()
            .collect();

        let (mastered_topics, needs_practice) = topic_buckets(&completed);

        Self {
            user_id,
            total_sessions: u32::try_from(sessions.len()).unwrap_or(u32::MAX),
            completed_sessions: u32::try_from(completed.len()).unwrap_or(u32::MAX),
            total_questions_answered: completed.iter().map(|s| s.questions_answered()).sum(),
            total_time_spent_hours,
            average_score: stats::mean(&session_scores),
            best_score: session_scores.iter().copied().reduce(f64::max),
            worst_score: session_scores.iter().copied().reduce(f64::min),
            technical_average: stats::mean(&technical),
            behavioral_average: stats::mean(&behavioral),
            improvement_rate: stats::halves_improvement(&session_scores),
            score_trend,
            top_strengths: top_labels(completed.iter().flat_map(|s| s.strengths())),
            top_weaknesses: top_labels(completed.iter().flat_map(|s| s.weaknesses())),
            mastered_topics,
            needs_practice,
            updated_at: now,
        }
    }
}

/// Most frequent labels, ties alphabetical, top five.
fn top_labels<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(5)
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Buckets question categories by their mean scores across all scored
/// responses: mastered at 80 and above, needs practice below 60.
fn topic_buckets(completed: &[&InterviewSession]) -> (Vec<String>, Vec<String>) {
    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for session in completed {
        for response in session.responses() {
            if let Some(score) = response.evaluation_score().filter(|_| response.is_scored()) {
                by_category
                    .entry(response.category())
                    .or_default()
                    .push(score);
            }
        }
    }

    let mut mastered = Vec::new();
    let mut needs_practice = Vec::new();
    for (category, scores) in by_category {
        let Some(mean) = stats::mean(&scores) else {
            continue;
        };
        if mean >= MASTERED_THRESHOLD {
            mastered.push(category.to_string());
        } else if mean < NEEDS_PRACTICE_THRESHOLD {
            needs_practice.push(category.to_string());
        }
    }
    (mastered, needs_practice)
}
