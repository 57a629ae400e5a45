use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::model::ids::UserId;
use crate::model::progress::UserProgress;

//
// ─── PROFICIENCY TIERS ─────────────────────────────────────────────────────────
//

/// Coarse proficiency bucket thresholded on the user's average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyTier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ProficiencyTier {
    /// Buckets: beginner below 60, intermediate below 80, advanced at 80 and
    /// above. A missing average is beginner.
    #[must_use]
    pub fn from_average(average_score: Option<f64>) -> Self {
        match average_score {
            None => Self::Beginner,
            Some(score) if score < 60.0 => Self::Beginner,
            Some(score) if score < 80.0 => Self::Intermediate,
            Some(_) => Self::Advanced,
        }
    }

    /// The tier to aim for next. Expert is its own target.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate => Self::Advanced,
            Self::Advanced | Self::Expert => Self::Expert,
        }
    }
}

impl fmt::Display for ProficiencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        };
        write!(f, "{name}")
    }
}

//
// ─── LEARNING PATH ─────────────────────────────────────────────────────────────
//

/// One item of the fixed-shape checklist attached to a learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub completed: bool,
}

/// Pointer to an external study resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub url: Url,
}

/// Generated recommendation bundle: where the user is, where to aim, what to
/// practice, and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub user_id: UserId,
    pub current_tier: ProficiencyTier,
    pub target_tier: ProficiencyTier,
    pub focus_areas: Vec<String>,
    pub suggested_frequency: String,
    pub estimated_weeks_to_goal: u32,
    pub checklist: Vec<ChecklistItem>,
    pub resources: Vec<LearningResource>,
}

impl LearningPath {
    /// Derives the path from a progress snapshot.
    #[must_use]
    pub fn from_progress(progress: &UserProgress) -> Self {
        let current_tier = ProficiencyTier::from_average(progress.average_score);

        Self {
            user_id: progress.user_id,
            current_tier,
            target_tier: current_tier.next(),
            focus_areas: progress.needs_practice.clone(),
            suggested_frequency: suggest_frequency(progress.total_sessions),
            estimated_weeks_to_goal: estimate_weeks(progress.completed_sessions),
            checklist: build_checklist(progress),
            resources: default_resources(),
        }
    }
}

fn suggest_frequency(total_sessions: u32) -> String {
    if total_sessions < 5 {
        "3-4 sessions per week".to_string()
    } else if total_sessions < 15 {
        "2-3 sessions per week".to_string()
    } else {
        "1-2 sessions per week to maintain".to_string()
    }
}

/// `max(12 - completed, 4) / 3` floored, never below two weeks.
fn estimate_weeks(completed_sessions: u32) -> u32 {
    let remaining = 12_u32.saturating_sub(completed_sessions).max(4);
    (remaining / 3).max(2)
}

fn build_checklist(progress: &UserProgress) -> Vec<ChecklistItem> {
    let average = progress.average_score.unwrap_or(0.0);
    vec![
        ChecklistItem {
            label: "Complete your first session".to_string(),
            completed: progress.completed_sessions >= 1,
        },
        ChecklistItem {
            label: "Answer 25 questions".to_string(),
            completed: progress.total_questions_answered >= 25,
        },
        ChecklistItem {
            label: "Reach a 70 average score".to_string(),
            completed: average >= 70.0,
        },
        ChecklistItem {
            label: "Complete 10 sessions".to_string(),
            completed: progress.completed_sessions >= 10,
        },
    ]
}

/// Static study links shipped with every path.
///
/// # Panics
///
/// Panics if a bundled URL literal is invalid, which would be a programming
/// error caught by the tests.
#[must_use]
fn default_resources() -> Vec<LearningResource> {
    let entries = [
        (
            "Interviewing guide",
            "https://www.techinterviewhandbook.org/",
        ),
        (
            "System design primer",
            "https://github.com/donnemartin/system-design-primer",
        ),
        ("Behavioral question bank", "https://www.themuse.com/advice/behavioral-interview-questions-answers-examples"),
    ];
    entries
        .into_iter()
        .map(|(title, url)| LearningResource {
            title: title.to_string(),
            url: Url::parse(url).expect("bundled resource url should be valid"),
        })
        .collect()
}
