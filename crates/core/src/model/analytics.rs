use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::model::ids::{SessionId, UserId};
use crate::model::session::{InterviewSession, SessionStatus};
use crate::model::stats;

//
// ─── WINDOWED ANALYTICS ────────────────────────────────────────────────────────
//

/// Reporting window for progress analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPeriod {
    Week,
    Month,
    Quarter,
    AllTime,
}

impl AnalyticsPeriod {
    /// Window size in days, `None` for all-time.
    #[must_use]
    pub fn cutoff_days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::AllTime => None,
        }
    }
}

impl fmt::Display for AnalyticsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::AllTime => "all_time",
        };
        write!(f, "{name}")
    }
}

/// Point-in-time report over the completed sessions inside one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalytics {
    pub user_id: UserId,
    pub period: AnalyticsPeriod,
    pub generated_at: DateTime<Utc>,
    pub total_sessions: u32,
    pub sessions_by_kind: BTreeMap<String, u32>,
    pub sessions_by_mode: BTreeMap<String, u32>,
    pub score_mean: Option<f64>,
    pub score_median: Option<f64>,
    pub score_variance: Option<f64>,
    /// Second-half mean vs first-half mean of the windowed scores, percent.
    pub improvement_percent: f64,
    pub score_by_date: BTreeMap<NaiveDate, f64>,
    pub questions_by_date: BTreeMap<NaiveDate, u32>,
    pub recommendations: Vec<String>,
}

impl ProgressAnalytics {
    /// Computes the report from the user's sessions, filtered to completed
    /// sessions created inside the window.
    #[must_use]
    pub fn compute(
        user_id: UserId,
        period: AnalyticsPeriod,
        sessions: &[InterviewSession],
        now: DateTime<Utc>,
    ) -> Self {
        let cutoff = period.cutoff_days().map(|days| now - Duration::days(days));
        let mut windowed: Vec<&InterviewSession> = sessions
            .iter()
            .filter(|s| s.status() == SessionStatus::Completed)
            .filter(|s| cutoff.is_none_or(|c| s.created_at() >= c))
            .collect();
        windowed.sort_by_key(|s| s.created_at());

        let scores: Vec<f64> = windowed.iter().filter_map(|s| s.average_score()).collect();

        let mut sessions_by_kind: BTreeMap<String, u32> = BTreeMap::new();
        let mut sessions_by_mode: BTreeMap<String, u32> = BTreeMap::new();
        for session in &windowed {
            *sessions_by_kind
                .entry(session.config().session_kind.to_string())
                .or_insert(0) += 1;
            *sessions_by_mode
                .entry(session.config().interview_mode.to_string())
                .or_insert(0) += 1;
        }

        // Calendar-day series: mean score per day, questions answered per day.
        let mut day_scores: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        let mut questions_by_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for session in &windowed {
            let day = session.created_at().date_naive();
            if let Some(score) = session.average_score() {
                day_scores.entry(day).or_default().push(score);
            }
            *questions_by_date.entry(day).or_insert(0) += session.questions_answered();
        }
        let score_by_date: BTreeMap<NaiveDate, f64> = day_scores
            .into_iter()
            .filter_map(|(day, scores)| stats::mean(&scores).map(|m| (day, m)))
            .collect();

        let improvement_percent = stats::halves_improvement(&scores);
        let recommendations = recommend(&windowed, &scores, improvement_percent);

        Self {
            user_id,
            period,
            generated_at: now,
            total_sessions: u32::try_from(windowed.len()).unwrap_or(u32::MAX),
            sessions_by_kind,
            sessions_by_mode,
            score_mean: stats::mean(&scores),
            score_median: stats::median(&scores),
            score_variance: stats::variance(&scores),
            improvement_percent,
            score_by_date,
            questions_by_date,
            recommendations,
        }
    }
}

/// Rule table for the recommendation strings.
fn recommend(
    windowed: &[&InterviewSession],
    scores: &[f64],
    improvement_percent: f64,
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(mean) = stats::mean(scores) {
        if mean < 70.0 {
            out.push(
                "Average score is below 70. Focus on fundamentals before harder questions."
                    .to_string(),
            );
        }
    }

    let answered: u32 = windowed.iter().map(|s| s.questions_answered()).sum();
    let skipped: u32 = windowed.iter().map(|s| s.questions_skipped()).sum();
    if answered > 0 && f64::from(skipped) > f64::from(answered) * 0.2 {
        out.push(
            "You skipped more than 20% of the questions you answered. Work on time management."
                .to_string(),
        );
    }

    if improvement_percent < 0.0 {
        out.push("Scores are trending down. Review the feedback from recent sessions.".to_string());
    }

    if windowed.len() < 3 {
        out.push("Fewer than three sessions in this window. Practice more regularly.".to_string());
    }

    if out.is_empty() {
        out.push("Solid progress. Keep the current practice cadence.".to_string());
    }
    out
}

//
// ─── SESSION COMPARISON ────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ComparisonError {
    #[error("sessions belong to different users")]
    DifferentUsers,

    #[error("sessions must belong to a user to be compared")]
    MissingUser,
}

/// Pairwise diff between two sessions of the same user.
///
/// `score_improvement` is order-aware (second minus first), so swapping the
/// arguments negates it; `consistency_score` is symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionComparison {
    pub first_session: SessionId,
    pub second_session: SessionId,
    pub score_improvement: f64,
    pub duration_delta_seconds: i64,
    /// `100 - |scoreA - scoreB|`, clamped at zero.
    pub consistency_score: f64,
    pub better_session: SessionId,
    /// Weaknesses of the first session no longer present in the second.
    pub improved_areas: Vec<String>,
    /// Weaknesses of the second session not present in the first.
    pub regressed_areas: Vec<String>,
}

impl SessionComparison {
    /// Compares two sessions of the same user.
    ///
    /// Sessions without an average score compare as zero.
    ///
    /// # Errors
    ///
    /// Returns `ComparisonError` if either session has no user or the users
    /// differ.
    pub fn compute(
        first: &InterviewSession,
        second: &InterviewSession,
    ) -> Result<Self, ComparisonError> {
        let first_user = first.user_id().ok_or(ComparisonError::MissingUser)?;
        let second_user = second.user_id().ok_or(ComparisonError::MissingUser)?;
        if first_user != second_user {
            return Err(ComparisonError::DifferentUsers);
        }

        let first_score = first.average_score().unwrap_or(0.0);
        let second_score = second.average_score().unwrap_or(0.0);
        let score_improvement = second_score - first_score;

        let duration_delta_seconds = i64::try_from(second.total_duration_seconds())
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(first.total_duration_seconds()).unwrap_or(i64::MAX));

        let better_session = if score_improvement >= 0.0 {
            second.session_id()
        } else {
            first.session_id()
        };

        Ok(Self {
            first_session: first.session_id(),
            second_session: second.session_id(),
            score_improvement,
            duration_delta_seconds,
            consistency_score: (100.0 - score_improvement.abs()).max(0.0),
            better_session,
            improved_areas: set_difference(first.weaknesses(), second.weaknesses()),
            regressed_areas: set_difference(second.weaknesses(), first.weaknesses()),
        })
    }
}

/// Items of `left` absent from `right`, order preserved, deduplicated.
fn set_difference(left: &[String], right: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    left.iter()
        .filter(|item| !right.contains(item))
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::evaluation::AnswerEvaluation;
    use crate::model::ids::EvaluationId;
    use crate::model::question::{Difficulty, GeneratedQuestion, QuestionType};
    use crate::model::session::{
        ExperienceLevel, InterviewMode, SessionConfig, SessionKind,
    };
    use crate::time::fixed_now;
    use chrono::Duration;

    fn config(kind: SessionKind) -> SessionConfig {
        SessionConfig {
            candidate_name: "Ada".into(),
            candidate_email: "ada@example.com".into(),
            target_role: "Backend Engineer".into(),
            target_company: None,
            experience_level: ExperienceLevel::Mid,
            interview_mode: InterviewMode::Practice,
            session_kind: kind,
        }
    }

    fn question() -> GeneratedQuestion {
        GeneratedQuestion {
            question: "Q".into(),
            question_type: QuestionType::Technical,
            difficulty: Difficulty::Medium,
            category: "general".into(),
            skills_tested: Vec::new(),
            expected_duration_minutes: 5,
        }
    }

    fn completed(
        user: Option<UserId>,
        score: f64,
        kind: SessionKind,
        created_offset_days: i64,
    ) -> InterviewSession {
        let questions = [question()];
        let created = fixed_now() + Duration::days(created_offset_days);
        let mut session = InterviewSession::new(
            SessionId::random(),
            user,
            config(kind),
            &questions,
            created,
        );
        session.start(created).unwrap();
        let evaluation = AnswerEvaluation::minimal(
            EvaluationId::random(),
            0,
            QuestionType::Technical,
            score,
        );
        session
            .record_answer(0, "answer".into(), 300, &evaluation, created)
            .unwrap();
        session.complete(created).unwrap();
        session
    }

    #[test]
    fn analytics_window_excludes_old_sessions() {
        let user = UserId::random();
        let now = fixed_now() + Duration::days(100);
        let sessions = vec![
            completed(Some(user), 60.0, SessionKind::Technical, 0),
            completed(Some(user), 80.0, SessionKind::Technical, 96),
        ];
        let report = ProgressAnalytics::compute(user, AnalyticsPeriod::Week, &sessions, now);
        assert_eq!(report.total_sessions, 1);
        assert_eq!(report.score_mean, Some(80.0));

        let all_time =
            ProgressAnalytics::compute(user, AnalyticsPeriod::AllTime, &sessions, now);
        assert_eq!(all_time.total_sessions, 2);
        assert_eq!(all_time.score_mean, Some(70.0));
    }

    #[test]
    fn analytics_counts_by_kind_and_mode() {
        let user = UserId::random();
        let sessions = vec![
            completed(Some(user), 70.0, SessionKind::Technical, 0),
            completed(Some(user), 70.0, SessionKind::Technical, 1),
            completed(Some(user), 70.0, SessionKind::Behavioral, 2),
        ];
        let report = ProgressAnalytics::compute(
            user,
            AnalyticsPeriod::AllTime,
            &sessions,
            fixed_now() + Duration::days(3),
        );
        assert_eq!(report.sessions_by_kind.get("technical"), Some(&2));
        assert_eq!(report.sessions_by_kind.get("behavioral"), Some(&1));
        assert_eq!(report.sessions_by_mode.get("practice"), Some(&3));
    }

    #[test]
    fn low_average_triggers_fundamentals_recommendation() {
        let user = UserId::random();
        let sessions = vec![completed(Some(user), 55.0, SessionKind::Technical, 0)];
        let report = ProgressAnalytics::compute(
            user,
            AnalyticsPeriod::AllTime,
            &sessions,
            fixed_now() + Duration::days(1),
        );
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("fundamentals")));
    }

    #[test]
    fn per_day_series_group_by_calendar_date() {
        let user = UserId::random();
        let sessions = vec![
            completed(Some(user), 60.0, SessionKind::Technical, 0),
            completed(Some(user), 80.0, SessionKind::Technical, 0),
            completed(Some(user), 90.0, SessionKind::Technical, 1),
        ];
        let report = ProgressAnalytics::compute(
            user,
            AnalyticsPeriod::AllTime,
            &sessions,
            fixed_now() + Duration::days(2),
        );
        let day0 = fixed_now().date_naive();
        assert_eq!(report.score_by_date.get(&day0), Some(&70.0));
        assert_eq!(report.questions_by_date.get(&day0), Some(&2));
        assert_eq!(report.score_by_date.len(), 2);
    }

    #[test]
    fn comparison_reports_deltas_and_consistency() {
        let user = UserId::random();
        let first = completed(Some(user), 50.0, SessionKind::Technical, 0);
        let second = completed(Some(user), 90.0, SessionKind::Technical, 1);

        let comparison = SessionComparison::compute(&first, &second).unwrap();
        assert_eq!(comparison.score_improvement, 40.0);
        assert_eq!(comparison.better_session, second.session_id());
        assert_eq!(comparison.consistency_score, 60.0);

        let reversed = SessionComparison::compute(&second, &first).unwrap();
        assert_eq!(reversed.score_improvement, -40.0);
        assert_eq!(reversed.consistency_score, 60.0);
        assert_eq!(reversed.better_session, second.session_id());
    }

    #[test]
    fn comparison_rejects_cross_user_pairs() {
        let first = completed(Some(UserId::random()), 50.0, SessionKind::Technical, 0);
        let second = completed(Some(UserId::random()), 60.0, SessionKind::Technical, 1);
        let err = SessionComparison::compute(&first, &second).unwrap_err();
        assert_eq!(err, ComparisonError::DifferentUsers);

        let anonymous = completed(None, 50.0, SessionKind::Technical, 0);
        let err = SessionComparison::compute(&anonymous, &first).unwrap_err();
        assert_eq!(err, ComparisonError::MissingUser);
    }

    #[test]
    fn set_difference_preserves_order_and_dedups() {
        let left = vec![
            "depth".to_string(),
            "examples".to_string(),
            "depth".to_string(),
            "clarity".to_string(),
        ];
        let right = vec!["clarity".to_string()];
        assert_eq!(
            set_difference(&left, &right),
            vec!["depth".to_string(), "examples".to_string()]
        );
        assert!(set_difference(&right, &right).is_empty());
    }
}
