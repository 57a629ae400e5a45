use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::progress::UserProgress;

//
// ─── MILESTONE CATALOG ─────────────────────────────────────────────────────────
//

/// Which progress figure a milestone thresholds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneMetric {
    CompletedSessions,
    AverageScore,
    QuestionsAnswered,
    ImprovementRate,
}

/// Declarative milestone definition. The catalog is data; evaluation is one
/// shared routine, so new milestones are new table rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MilestoneDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub metric: MilestoneMetric,
    pub threshold: f64,
}

const CATALOG: &[MilestoneDef] = &[
    MilestoneDef {
        id: "first_session",
        title: "First Session",
        description: "Complete your first interview session",
        metric: MilestoneMetric::CompletedSessions,
        threshold: 1.0,
    },
    MilestoneDef {
        id: "ten_sessions",
        title: "Ten Sessions",
        description: "Complete ten interview sessions",
        metric: MilestoneMetric::CompletedSessions,
        threshold: 10.0,
    },
    MilestoneDef {
        id: "high_average",
        title: "High Scorer",
        description: "Reach an average score of 80",
        metric: MilestoneMetric::AverageScore,
        threshold: 80.0,
    },
    MilestoneDef {
        id: "hundred_questions",
        title: "Question Marathon",
        description: "Answer one hundred questions",
        metric: MilestoneMetric::QuestionsAnswered,
        threshold: 100.0,
    },
    MilestoneDef {
        id: "improver",
        title: "On The Rise",
        description: "Improve your scores by twenty percent",
        metric: MilestoneMetric::ImprovementRate,
        threshold: 20.0,
    },
];

/// The fixed milestone catalog.
#[must_use]
pub fn milestone_catalog() -> &'static [MilestoneDef] {
    CATALOG
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// One milestone evaluated against a progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneStatus {
    pub id: String,
    pub title: String,
    pub description: String,
    pub achieved: bool,
    /// Fraction of the threshold reached, clamped to `[0, 1]`.
    pub progress: f64,
    /// Best-effort timestamp of when the milestone first read as achieved.
    pub achieved_at: Option<DateTime<Utc>>,
}

impl MilestoneDef {
    /// Current value of this milestone's metric in the snapshot.
    #[must_use]
    pub fn current_value(&self, progress: &UserProgress) -> f64 {
        match self.metric {
            MilestoneMetric::CompletedSessions => f64::from(progress.completed_sessions),
            MilestoneMetric::AverageScore => progress.average_score.unwrap_or(0.0),
            MilestoneMetric::QuestionsAnswered => f64::from(progress.total_questions_answered),
            MilestoneMetric::ImprovementRate => progress.improvement_rate,
        }
    }

    /// Evaluates the definition against a progress snapshot.
    #[must_use]
    pub fn evaluate(
        &self,
        progress: &UserProgress,
        achieved_at: Option<DateTime<Utc>>,
    ) -> MilestoneStatus {
        let current = self.current_value(progress);
        let achieved = current >= self.threshold;
        let fraction = if self.threshold > 0.0 {
            (current / self.threshold).clamp(0.0, 1.0)
        } else {
            1.0
        };
        MilestoneStatus {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            achieved,
            progress: fraction,
            achieved_at,
        }
    }
}
