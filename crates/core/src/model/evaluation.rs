use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::{EvaluationId, SessionId};
use crate::model::question::QuestionType;
use crate::model::stats;

//
// ─── SINGLE-ANSWER EVALUATION ──────────────────────────────────────────────────
//

/// Coarse banding of a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    Poor,
    Average,
    Good,
    Excellent,
}

impl ScoreLevel {
    /// Bands: excellent >= 85, good >= 70, average >= 50, poor below.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for ScoreLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Poor => "poor",
            Self::Average => "average",
            Self::Good => "good",
            Self::Excellent => "excellent",
        };
        write!(f, "{name}")
    }
}

/// Category a feedback item falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Strength,
    Weakness,
    Suggestion,
}

/// One piece of categorized feedback on an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub kind: FeedbackKind,
    pub category: String,
    pub message: String,
}

/// Score against one rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: f64,
    pub comment: Option<String>,
}

/// The scored, feedback-annotated result of grading one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub evaluation_id: EvaluationId,
    pub question_id: u32,
    pub question_type: QuestionType,
    pub overall_score: f64,
    pub score_level: ScoreLevel,
    pub criterion_scores: Vec<CriterionScore>,
    pub feedback: Vec<FeedbackItem>,
    pub covered_points: Vec<String>,
    pub missing_points: Vec<String>,
    pub summary: String,
}

impl AnswerEvaluation {
    /// A score-only evaluation, rebuilt from persisted session state when the
    /// full feedback is no longer at hand.
    #[must_use]
    pub fn minimal(
        evaluation_id: EvaluationId,
        question_id: u32,
        question_type: QuestionType,
        overall_score: f64,
    ) -> Self {
        let overall_score = overall_score.clamp(0.0, 100.0);
        Self {
            evaluation_id,
            question_id,
            question_type,
            overall_score,
            score_level: ScoreLevel::from_score(overall_score),
            criterion_scores: Vec::new(),
            feedback: Vec::new(),
            covered_points: Vec::new(),
            missing_points: Vec::new(),
            summary: String::new(),
        }
    }

    /// Feedback items of the given kind.
    pub fn feedback_of(&self, kind: FeedbackKind) -> impl Iterator<Item = &FeedbackItem> {
        self.feedback.iter().filter(move |item| item.kind == kind)
    }
}

//
// ─── SESSION SUMMARY ───────────────────────────────────────────────────────────
//

/// Four-tier hiring signal derived from the aggregate scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiringRecommendation {
    No,
    Maybe,
    Yes,
    StrongYes,
}

impl fmt::Display for HiringRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::No => "no",
            Self::Maybe => "maybe",
            Self::Yes => "yes",
            Self::StrongYes => "strong_yes",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("cannot summarize a session with no evaluations")]
    NoEvaluations,
}

/// Aggregate summary over the evaluations of one session: mean score,
/// score-level histogram, per-track sub-means, the most common feedback
/// categories, a consistency score, and a hiring recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub total_evaluated: u32,
    pub mean_score: f64,
    pub excellent: u32,
    pub good: u32,
    pub average: u32,
    pub poor: u32,
    pub technical_mean: Option<f64>,
    pub behavioral_mean: Option<f64>,
    pub top_strengths: Vec<String>,
    pub top_weaknesses: Vec<String>,
    pub consistency_score: f64,
    pub recommendation: HiringRecommendation,
}

impl SessionSummary {
    /// Aggregates a batch of evaluations into a session summary.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::NoEvaluations` for an empty batch.
    pub fn from_evaluations(
        session_id: SessionId,
        evaluations: &[AnswerEvaluation],
    ) -> Result<Self, SummaryError> {
        if evaluations.is_empty() {
            return Err(SummaryError::NoEvaluations);
        }

        let scores: Vec<f64> = evaluations.iter().map(|e| e.overall_score).collect();
        let mean_score = stats::mean(&scores).unwrap_or(0.0);

        let mut excellent = 0_u32;
        let mut good = 0_u32;
        let mut average = 0_u32;
        let mut poor = 0_u32;
        for evaluation in evaluations {
            match ScoreLevel::from_score(evaluation.overall_score) {
                ScoreLevel::Excellent => excellent += 1,
                ScoreLevel::Good => good += 1,
                ScoreLevel::Average => average += 1,
                ScoreLevel::Poor => poor += 1,
            }
        }

        let technical: Vec<f64> = evaluations
            .iter()
            .filter(|e| e.question_type.is_technical_like())
            .map(|e| e.overall_score)
            .collect();
        let behavioral: Vec<f64> = evaluations
            .iter()
            .filter(|e| e.question_type.is_behavioral_like())
            .map(|e| e.overall_score)
            .collect();

        let consistency_score =
            (100.0 - stats::std_dev(&scores).unwrap_or(0.0)).clamp(0.0, 100.0);

        let recommendation = recommend(mean_score, consistency_score);

        let total_evaluated = u32::try_from(evaluations.len()).unwrap_or(u32::MAX);

        Ok(Self {
            session_id,
            total_evaluated,
            mean_score,
            excellent,
            good,
            average,
            poor,
            technical_mean: stats::mean(&technical),
            behavioral_mean: stats::mean(&behavioral),
            top_strengths: top_categories(evaluations, FeedbackKind::Strength),
            top_weaknesses: top_categories(evaluations, FeedbackKind::Weakness),
            consistency_score,
            recommendation,
        })
    }

    /// One-paragraph textual rendering for the session record.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = format!(
            "Evaluated {} answer(s) with a mean score of {:.1} and a consistency score of {:.1}.",
            self.total_evaluated, self.mean_score, self.consistency_score
        );
        if let Some(technical) = self.technical_mean {
            text.push_str(&format!(" Technical average {technical:.1}."));
        }
        if let Some(behavioral) = self.behavioral_mean {
            text.push_str(&format!(" Behavioral average {behavioral:.1}."));
        }
        text.push_str(&format!(" Recommendation: {}.", self.recommendation));
        text
    }

    /// Actionable next-step strings derived from the summary.
    #[must_use]
    pub fn advice(&self) -> Vec<String> {
        let mut out = Vec::new();
        match self.recommendation {
            HiringRecommendation::StrongYes => {
                out.push("Interview-ready. Keep the current cadence to stay sharp.".to_string());
            }
            HiringRecommendation::Yes => {
                out.push(
                    "Close to target. Polish weaker answers before a real interview.".to_string(),
                );
            }
            HiringRecommendation::Maybe => {
                out.push("Mixed results. Drill the weak areas below before rescheduling."
                    .to_string());
            }
            HiringRecommendation::No => {
                out.push(
                    "Build a study plan around the fundamentals before the next attempt."
                        .to_string(),
                );
            }
        }
        for weakness in &self.top_weaknesses {
            out.push(format!("Focus additional practice on {weakness}."));
        }
        out
    }
}

fn recommend(mean_score: f64, consistency_score: f64) -> HiringRecommendation {
    if mean_score >= 85.0 && consistency_score >= 70.0 {
        HiringRecommendation::StrongYes
    } else if mean_score >= 70.0 {
        HiringRecommendation::Yes
    } else if mean_score >= 55.0 {
        HiringRecommendation::Maybe
    } else {
        HiringRecommendation::No
    }
}

/// Most common feedback categories of the given kind, ties broken
/// alphabetically, top three.
fn top_categories(evaluations: &[AnswerEvaluation], kind: FeedbackKind) -> Vec<String> {
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for evaluation in evaluations {
        for item in evaluation.feedback_of(kind) {
            *counts.entry(item.category.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(3)
        .map(|(category, _)| category.to_string())
        .collect()
}
