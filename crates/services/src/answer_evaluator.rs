//! Answer evaluation: rubric-aware LLM grading with a deterministic
//! heuristic fallback, so scoring never hard-fails.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use prep_core::model::{
    AnswerEvaluation, CriterionScore, Difficulty, EvaluationId, ExperienceLevel, FeedbackItem,
    FeedbackKind, QuestionType, ScoreLevel, SessionId, SessionSummary, SummaryError,
};

use crate::error::EvaluatorError;
use crate::llm::LanguageModel;

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// One question-and-answer pair to grade, with its rubric context.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub session_id: SessionId,
    pub question_id: u32,
    pub question: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub answer_text: String,
    /// Points a good answer is expected to touch. May be empty.
    pub expected_points: Vec<String>,
    pub target_role: String,
    pub experience_level: ExperienceLevel,
}

/// Answer evaluation capability consumed by the session manager.
#[async_trait]
pub trait EvaluateAnswers: Send + Sync {
    /// Grade one answer.
    ///
    /// # Errors
    ///
    /// Returns `EvaluatorError` only for implementations without a fallback
    /// scorer; the bundled evaluator degrades instead of failing.
    async fn evaluate_answer(
        &self,
        request: &EvaluationRequest,
    ) -> Result<AnswerEvaluation, EvaluatorError>;

    /// Aggregate a session's evaluations into a summary.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::NoEvaluations` for an empty batch.
    fn summarize_session(
        &self,
        session_id: SessionId,
        evaluations: &[AnswerEvaluation],
    ) -> Result<SessionSummary, SummaryError> {
        SessionSummary::from_evaluations(session_id, evaluations)
    }
}

//
// ─── EVALUATOR ─────────────────────────────────────────────────────────────────
//

/// LLM-backed evaluator with the heuristic scorer as fallback.
pub struct AnswerEvaluator {
    model: Arc<dyn LanguageModel>,
}

impl AnswerEvaluator {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl EvaluateAnswers for AnswerEvaluator {
    async fn evaluate_answer(
        &self,
        request: &EvaluationRequest,
    ) -> Result<AnswerEvaluation, EvaluatorError> {
        let prompt = build_prompt(request);
        match self.model.generate_json(&prompt).await {
            Ok(value) => match parse_evaluation(&value, request) {
                Ok(evaluation) => Ok(evaluation),
                Err(err) => {
                    tracing::warn!(error = %err, "unparseable evaluation reply, using heuristic scorer");
                    Ok(heuristic_evaluation(request))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "evaluation call failed, using heuristic scorer");
                Ok(heuristic_evaluation(request))
            }
        }
    }
}

/// Rubric criteria per question type.
#[must_use]
pub fn default_criteria(question_type: QuestionType) -> &'static [&'static str] {
    match question_type {
        QuestionType::Technical => &["correctness", "depth", "clarity", "trade-offs"],
        QuestionType::Behavioral => &["structure", "impact", "reflection", "communication"],
        QuestionType::Situational => &["judgment", "prioritization", "communication"],
        QuestionType::SystemDesign => &["requirements", "architecture", "scalability", "trade-offs"],
    }
}

fn build_prompt(request: &EvaluationRequest) -> String {
    let criteria = default_criteria(request.question_type).join(", ");
    let mut prompt = format!(
        "You are grading an interview answer for a {} candidate applying as {}.\n\
         Question ({}, {} difficulty): {}\n\nAnswer:\n{}\n\n\
         Grade against these criteria: {criteria}.",
        request.experience_level,
        request.target_role,
        request.question_type,
        request.difficulty,
        request.question,
        request.answer_text,
    );
    if !request.expected_points.is_empty() {
        let _ = write!(
            prompt,
            "\nA strong answer covers: {}.",
            request.expected_points.join("; ")
        );
    }
    prompt.push_str(
        "\n\nReply with a JSON object only, with fields: \"overall_score\" (0-100), \
         \"criterion_scores\" (array of {\"criterion\", \"score\", \"comment\"}), \
         \"strengths\", \"weaknesses\", \"suggestions\" (arrays of {\"category\", \"message\"}), \
         \"covered_points\", \"missing_points\" (arrays of strings), \"summary\" (string).",
    );
    prompt
}

//
// ─── LLM REPLY PARSING ─────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct RawFeedback {
    category: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawCriterion {
    criterion: String,
    score: f64,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    overall_score: f64,
    #[serde(default)]
    criterion_scores: Vec<RawCriterion>,
    #[serde(default)]
    strengths: Vec<RawFeedback>,
    #[serde(default)]
    weaknesses: Vec<RawFeedback>,
    #[serde(default)]
    suggestions: Vec<RawFeedback>,
    #[serde(default)]
    covered_points: Vec<String>,
    #[serde(default)]
    missing_points: Vec<String>,
    #[serde(default)]
    summary: String,
}

fn parse_evaluation(
    value: &serde_json::Value,
    request: &EvaluationRequest,
) -> Result<AnswerEvaluation, serde_json::Error> {
    let raw: RawEvaluation = serde_json::from_value(value.clone())?;
    let overall_score = raw.overall_score.clamp(0.0, 100.0);

    let mut feedback = Vec::new();
    for (kind, items) in [
        (FeedbackKind::Strength, raw.strengths),
        (FeedbackKind::Weakness, raw.weaknesses),
        (FeedbackKind::Suggestion, raw.suggestions),
    ] {
        feedback.extend(items.into_iter().map(|item| FeedbackItem {
            kind,
            category: item.category,
            message: item.message,
        }));
    }

    Ok(AnswerEvaluation {
        evaluation_id: EvaluationId::random(),
        question_id: request.question_id,
        question_type: request.question_type,
        overall_score,
        score_level: ScoreLevel::from_score(overall_score),
        criterion_scores: raw
            .criterion_scores
            .into_iter()
            .map(|c| CriterionScore {
                criterion: c.criterion,
                score: c.score.clamp(0.0, 100.0),
                comment: c.comment,
            })
            .collect(),
        feedback,
        covered_points: raw.covered_points,
        missing_points: raw.missing_points,
        summary: raw.summary,
    })
}

//
// ─── HEURISTIC FALLBACK ────────────────────────────────────────────────────────
//

const STRUCTURE_CUES: &[&str] = &[
    "first",
    "then",
    "finally",
    "for example",
    "because",
    "trade-off",
    "tradeoff",
    "in summary",
];

/// Deterministic scorer used when the language model is unavailable: answer
/// length, keyword overlap with the expected points, and structural cues.
#[must_use]
pub fn heuristic_evaluation(request: &EvaluationRequest) -> AnswerEvaluation {
    let answer = request.answer_text.trim();
    let lowered = answer.to_lowercase();
    let word_count = answer.split_whitespace().count();

    let (covered_points, missing_points) = match_points(&lowered, &request.expected_points);

    // Length: up to 40 points at 150 words. Coverage: up to 25. Structure: 5.
    #[allow(clippy::cast_precision_loss)]
    let length_component = (word_count.min(150) as f64 / 150.0) * 40.0;
    let coverage_component = if request.expected_points.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let fraction = covered_points.len() as f64 / request.expected_points.len() as f64;
        fraction * 25.0
    };
    let has_structure = STRUCTURE_CUES.iter().any(|cue| lowered.contains(cue));
    let structure_component = if has_structure { 5.0 } else { 0.0 };

    let base = if word_count == 0 { 0.0 } else { 30.0 };
    let overall_score =
        (base + length_component + coverage_component + structure_component).clamp(0.0, 100.0);

    let mut feedback = Vec::new();
    if word_count < 30 {
        feedback.push(FeedbackItem {
            kind: FeedbackKind::Weakness,
            category: "depth".into(),
            message: "The answer is very short; expand with specifics.".into(),
        });
    }
    if has_structure {
        feedback.push(FeedbackItem {
            kind: FeedbackKind::Strength,
            category: "structure".into(),
            message: "The answer follows a clear structure.".into(),
        });
    } else {
        feedback.push(FeedbackItem {
            kind: FeedbackKind::Suggestion,
            category: "structure".into(),
            message: "Structure the answer: situation, action, result.".into(),
        });
    }
    if !missing_points.is_empty() {
        feedback.push(FeedbackItem {
            kind: FeedbackKind::Suggestion,
            category: "coverage".into(),
            message: format!("Also touch on: {}.", missing_points.join("; ")),
        });
    } else if !covered_points.is_empty() {
        feedback.push(FeedbackItem {
            kind: FeedbackKind::Strength,
            category: "coverage".into(),
            message: "The answer covers the expected points.".into(),
        });
    }

    let criterion_scores = default_criteria(request.question_type)
        .iter()
        .map(|criterion| CriterionScore {
            criterion: (*criterion).to_string(),
            score: overall_score,
            comment: None,
        })
        .collect();

    AnswerEvaluation {
        evaluation_id: EvaluationId::random(),
        question_id: request.question_id,
        question_type: request.question_type,
        overall_score,
        score_level: ScoreLevel::from_score(overall_score),
        criterion_scores,
        feedback,
        covered_points,
        missing_points,
        summary: format!(
            "Heuristic evaluation: {overall_score:.0}/100 from answer length, expected-point \
             coverage, and structure."
        ),
    }
}

/// A point counts as covered when any of its significant words appears in the
/// answer.
fn match_points(lowered_answer: &str, expected: &[String]) -> (Vec<String>, Vec<String>) {
    let mut covered = Vec::new();
    let mut missing = Vec::new();
    for point in expected {
        let hit = point
            .to_lowercase()
            .split_whitespace()
            .filter(|word| word.len() > 3)
            .any(|word| lowered_answer.contains(word));
        if hit {
            covered.push(point.clone());
        } else {
            missing.push(point.clone());
        }
    }
    (covered, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    fn request(answer: &str, expected: Vec<String>) -> EvaluationRequest {
        EvaluationRequest {
            session_id: SessionId::random(),
            question_id: 0,
            question: "Explain database indexing.".into(),
            question_type: QuestionType::Technical,
            difficulty: Difficulty::Medium,
            answer_text: answer.into(),
            expected_points: expected,
            target_role: "Backend Engineer".into(),
            experience_level: ExperienceLevel::Mid,
        }
    }

    struct FixedModel {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.reply.clone().map_err(|()| LlmError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn parses_full_llm_evaluation() {
        let reply = r#"{
            "overall_score": 86,
            "criterion_scores": [{"criterion": "correctness", "score": 90, "comment": "solid"}],
            "strengths": [{"category": "depth", "message": "covers internals"}],
            "weaknesses": [],
            "suggestions": [{"category": "examples", "message": "add a concrete query"}],
            "covered_points": ["btree"],
            "missing_points": [],
            "summary": "Strong answer."
        }"#;
        let evaluator = AnswerEvaluator::new(Arc::new(FixedModel {
            reply: Ok(reply.into()),
        }));

        let evaluation = evaluator
            .evaluate_answer(&request("B-trees keep lookups logarithmic.", Vec::new()))
            .await
            .unwrap();
        assert_eq!(evaluation.overall_score, 86.0);
        assert_eq!(evaluation.score_level, ScoreLevel::Excellent);
        assert_eq!(evaluation.criterion_scores.len(), 1);
        assert_eq!(evaluation.feedback.len(), 2);
        assert_eq!(evaluation.summary, "Strong answer.");
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_heuristic() {
        let evaluator = AnswerEvaluator::new(Arc::new(FixedModel { reply: Err(()) }));
        let evaluation = evaluator
            .evaluate_answer(&request(
                "First, indexes avoid full scans because lookups follow the tree. \
                 For example, a B-tree keeps pages balanced. Finally, writes pay the cost.",
                vec!["B-tree".into()],
            ))
            .await
            .unwrap();
        assert!(evaluation.overall_score > 0.0);
        assert!(evaluation.overall_score <= 100.0);
        assert!(evaluation.summary.starts_with("Heuristic evaluation"));
    }

    #[tokio::test]
    async fn malformed_reply_falls_back_to_heuristic() {
        let evaluator = AnswerEvaluator::new(Arc::new(FixedModel {
            reply: Ok("score is about 80".into()),
        }));
        let evaluation = evaluator
            .evaluate_answer(&request("A short answer.", Vec::new()))
            .await
            .unwrap();
        assert!(evaluation.summary.starts_with("Heuristic evaluation"));
    }

    #[test]
    fn heuristic_is_deterministic_and_bounded() {
        let req = request(
            "Indexes trade write amplification for read speed because lookups become logarithmic.",
            vec!["write cost".into(), "logarithmic lookup".into()],
        );
        let first = heuristic_evaluation(&req);
        let second = heuristic_evaluation(&req);
        assert_eq!(first.overall_score, second.overall_score);
        assert!((0.0..=100.0).contains(&first.overall_score));
    }

    #[test]
    fn heuristic_scores_empty_answer_zero() {
        let evaluation = heuristic_evaluation(&request("", Vec::new()));
        assert_eq!(evaluation.overall_score, 0.0);
        assert_eq!(evaluation.score_level, ScoreLevel::Poor);
    }

    #[test]
    fn heuristic_rewards_coverage() {
        let with_coverage = heuristic_evaluation(&request(
            "The B-tree index keeps lookups fast.",
            vec!["B-tree".into()],
        ));
        let without_coverage = heuristic_evaluation(&request(
            "The answer rambles about unrelated topics entirely.",
            vec!["B-tree".into()],
        ));
        assert!(with_coverage.overall_score > without_coverage.overall_score);
        assert_eq!(with_coverage.missing_points.len(), 0);
        assert_eq!(without_coverage.missing_points.len(), 1);
    }

    #[test]
    fn heuristic_flags_short_answers() {
        let evaluation = heuristic_evaluation(&request("Too short.", Vec::new()));
        assert!(evaluation
            .feedback
            .iter()
            .any(|f| f.kind == FeedbackKind::Weakness && f.category == "depth"));
    }

    #[test]
    fn summarize_session_delegates_to_aggregation() {
        let evaluator = AnswerEvaluator::new(Arc::new(FixedModel { reply: Err(()) }));
        let evaluations = vec![AnswerEvaluation::minimal(
            EvaluationId::random(),
            0,
            QuestionType::Technical,
            80.0,
        )];
        let summary = evaluator
            .summarize_session(SessionId::random(), &evaluations)
            .unwrap();
        assert_eq!(summary.total_evaluated, 1);
        assert!(evaluator
            .summarize_session(SessionId::random(), &[])
            .is_err());
    }
}
