//! Interview question generation: LLM-backed with a deterministic template
//! bank as the fallback path.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use prep_core::model::{
    Difficulty, ExperienceLevel, GeneratedQuestion, QuestionSet, QuestionType,
};

use crate::error::GeneratorError;
use crate::llm::LanguageModel;

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// What to generate questions for.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub target_role: String,
    pub target_company: Option<String>,
    pub experience_level: ExperienceLevel,
    pub resume_context: Option<String>,
    pub focus_areas: Vec<String>,
    pub num_technical: u8,
    pub num_behavioral: u8,
    pub num_situational: u8,
    pub num_system_design: u8,
}

impl GenerationRequest {
    /// Total number of questions requested across all types.
    #[must_use]
    pub fn total(&self) -> usize {
        usize::from(self.num_technical)
            + usize::from(self.num_behavioral)
            + usize::from(self.num_situational)
            + usize::from(self.num_system_design)
    }

    fn counts(&self) -> [(QuestionType, u8); 4] {
        [
            (QuestionType::Technical, self.num_technical),
            (QuestionType::Behavioral, self.num_behavioral),
            (QuestionType::Situational, self.num_situational),
            (QuestionType::SystemDesign, self.num_system_design),
        ]
    }
}

/// Question generation capability consumed by the session manager.
#[async_trait]
pub trait GenerateQuestions: Send + Sync {
    /// Produce the requested question mix, in a stable per-type order.
    ///
    /// The returned set should have `request.total()` questions; a parse
    /// failure on a partially valid reply may under-fill rather than retry.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` only for implementations without a fallback
    /// path; the bundled generator degrades instead of failing.
    async fn generate_questions(
        &self,
        request: &GenerationRequest,
    ) -> Result<QuestionSet, GeneratorError>;
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// LLM-backed generator with a per-level template bank fallback.
pub struct QuestionGenerator {
    model: Arc<dyn LanguageModel>,
}

impl QuestionGenerator {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    async fn questions_of_type(
        &self,
        request: &GenerationRequest,
        question_type: QuestionType,
        count: u8,
    ) -> Vec<GeneratedQuestion> {
        let prompt = build_prompt(request, question_type, count);
        match self.model.generate_json(&prompt).await {
            Ok(value) => match parse_questions(&value, question_type, request.experience_level) {
                Ok(questions) if !questions.is_empty() => {
                    // The model may return fewer than asked; that under-fill
                    // is accepted as-is.
                    questions.into_iter().take(usize::from(count)).collect()
                }
                Ok(_) | Err(_) => {
                    tracing::warn!(%question_type, "unusable generator reply, using template bank");
                    fallback_questions(request, question_type, count)
                }
            },
            Err(err) => {
                tracing::warn!(%question_type, error = %err, "generator call failed, using template bank");
                fallback_questions(request, question_type, count)
            }
        }
    }
}

#[async_trait]
impl GenerateQuestions for QuestionGenerator {
    async fn generate_questions(
        &self,
        request: &GenerationRequest,
    ) -> Result<QuestionSet, GeneratorError> {
        let mut questions = Vec::with_capacity(request.total());
        for (question_type, count) in request.counts() {
            if count == 0 {
                continue;
            }
            questions.extend(self.questions_of_type(request, question_type, count).await);
        }
        Ok(QuestionSet::new(questions))
    }
}

//
// ─── PROMPTS AND PARSING ───────────────────────────────────────────────────────
//

fn build_prompt(request: &GenerationRequest, question_type: QuestionType, count: u8) -> String {
    let mut prompt = format!(
        "Generate {count} {question_type} interview questions for a {} candidate applying for \
         the role of {}.",
        request.experience_level, request.target_role
    );
    if let Some(company) = &request.target_company {
        let _ = write!(prompt, " The target company is {company}.");
    }
    if !request.focus_areas.is_empty() {
        let _ = write!(prompt, " Focus on: {}.", request.focus_areas.join(", "));
    }
    if let Some(resume) = &request.resume_context {
        let _ = write!(prompt, "\n\nCandidate resume context:\n{resume}");
    }
    prompt.push_str(
        "\n\nReply with a JSON array only. Each element must have the fields: \
         \"question\" (string), \"difficulty\" (easy|medium|hard), \"category\" (string), \
         \"skills_tested\" (array of strings), \"expected_duration_minutes\" (integer).",
    );
    prompt
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    skills_tested: Vec<String>,
    #[serde(default)]
    expected_duration_minutes: Option<u32>,
}

fn parse_questions(
    value: &serde_json::Value,
    question_type: QuestionType,
    level: ExperienceLevel,
) -> Result<Vec<GeneratedQuestion>, serde_json::Error> {
    let raw: Vec<RawQuestion> = serde_json::from_value(value.clone())?;
    Ok(raw
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .map(|q| GeneratedQuestion {
            question: q.question,
            question_type,
            difficulty: q.difficulty.unwrap_or_else(|| default_difficulty(level)),
            category: q.category.unwrap_or_else(|| question_type.to_string()),
            skills_tested: q.skills_tested,
            expected_duration_minutes: q
                .expected_duration_minutes
                .unwrap_or(default_duration(question_type)),
        })
        .collect())
}

fn default_difficulty(level: ExperienceLevel) -> Difficulty {
    match level {
        ExperienceLevel::Junior => Difficulty::Easy,
        ExperienceLevel::Mid => Difficulty::Medium,
        ExperienceLevel::Senior => Difficulty::Hard,
    }
}

fn default_duration(question_type: QuestionType) -> u32 {
    match question_type {
        QuestionType::Technical => 6,
        QuestionType::Behavioral | QuestionType::Situational => 4,
        QuestionType::SystemDesign => 10,
    }
}

//
// ─── TEMPLATE BANK ─────────────────────────────────────────────────────────────
//

/// Fixed fallback templates, indexed by question type and experience level.
/// `{role}` is substituted with the requested role.
fn template_bank(question_type: QuestionType, level: ExperienceLevel) -> &'static [&'static str] {
    match (question_type, level) {
        (QuestionType::Technical, ExperienceLevel::Junior) => &[
            "Walk me through a piece of code you wrote recently. What does it do?",
            "What is the difference between an array and a linked list, and when would you use each?",
            "How do you debug a program that produces the wrong output for a {role} task?",
        ],
        (QuestionType::Technical, ExperienceLevel::Mid) => &[
            "Describe a performance problem you diagnosed as a {role}. How did you find the bottleneck?",
            "How would you design the error-handling strategy for a medium-sized service?",
            "Explain how you would test a module with several external dependencies.",
        ],
        (QuestionType::Technical, ExperienceLevel::Senior) => &[
            "Tell me about a technical decision you made as a {role} that you later reversed. Why?",
            "How do you evaluate whether to adopt a new technology on a critical code path?",
            "Describe how you would lead the migration of a legacy component without a feature freeze.",
        ],
        (QuestionType::Behavioral, ExperienceLevel::Junior) => &[
            "Tell me about a time you had to learn something new quickly for a project.",
            "Describe a situation where you received difficult feedback. How did you react?",
        ],
        (QuestionType::Behavioral, ExperienceLevel::Mid) => &[
            "Tell me about a conflict with a teammate and how you resolved it.",
            "Describe a project that did not go as planned. What did you change afterwards?",
        ],
        (QuestionType::Behavioral, ExperienceLevel::Senior) => &[
            "Tell me about a time you had to influence a decision without formal authority.",
            "Describe how you have mentored engineers who were struggling.",
        ],
        (QuestionType::Situational, ExperienceLevel::Junior) => &[
            "Your task is blocked on a teammate's unreviewed change. What do you do?",
            "You discover a bug in production just before the end of your day. Walk me through your next hour.",
        ],
        (QuestionType::Situational, ExperienceLevel::Mid) => &[
            "A stakeholder asks for a feature that conflicts with this sprint's commitments. How do you respond?",
            "Halfway through a project the requirements change substantially. What is your plan?",
        ],
        (QuestionType::Situational, ExperienceLevel::Senior) => &[
            "Two teams you depend on give you conflicting timelines. How do you proceed?",
            "You inherit a system with no documentation and a looming deadline. What are your first steps?",
        ],
        (QuestionType::SystemDesign, ExperienceLevel::Junior) => &[
            "Design a URL shortener. What are the main components?",
            "How would you store and serve user profile pictures for a small web app?",
        ],
        (QuestionType::SystemDesign, ExperienceLevel::Mid) => &[
            "Design a rate limiter for a public API. Discuss the trade-offs.",
            "Design the backend for a collaborative to-do list used by small teams.",
        ],
        (QuestionType::SystemDesign, ExperienceLevel::Senior) => &[
            "Design a metrics pipeline ingesting events from thousands of hosts.",
            "Design a notification system that must not double-send under failure. What guarantees can you give?",
        ],
    }
}

fn fallback_questions(
    request: &GenerationRequest,
    question_type: QuestionType,
    count: u8,
) -> Vec<GeneratedQuestion> {
    let bank = template_bank(question_type, request.experience_level);
    (0..usize::from(count))
        .map(|i| {
            let template = bank[i % bank.len()];
            GeneratedQuestion {
                question: template.replace("{role}", &request.target_role),
                question_type,
                difficulty: default_difficulty(request.experience_level),
                category: question_type.to_string(),
                skills_tested: request.focus_areas.clone(),
                expected_duration_minutes: default_duration(question_type),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    fn request() -> GenerationRequest {
        GenerationRequest {
            target_role: "Backend Engineer".into(),
            target_company: Some("Initech".into()),
            experience_level: ExperienceLevel::Mid,
            resume_context: None,
            focus_areas: vec!["databases".into()],
            num_technical: 2,
            num_behavioral: 1,
            num_situational: 0,
            num_system_design: 0,
        }
    }

    /// Scripted model: returns the configured replies in order, errors after.
    struct ScriptedModel {
        replies: std::sync::Mutex<Vec<Result<String, ()>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String, ()>>) -> Self {
            Self {
                replies: std::sync::Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            let mut guard = self.replies.lock().unwrap();
            if guard.is_empty() {
                return Err(LlmError::Disabled);
            }
            guard.remove(0).map_err(|()| LlmError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn fills_requested_counts_from_llm() {
        let technical = r#"[
            {"question": "T1", "difficulty": "hard", "category": "algorithms",
             "skills_tested": ["big-o"], "expected_duration_minutes": 8},
            {"question": "T2"}
        ]"#;
        let behavioral = r#"[{"question": "B1", "category": "teamwork"}]"#;
        let model = ScriptedModel::new(vec![Ok(technical.into()), Ok(behavioral.into())]);
        let generator = QuestionGenerator::new(Arc::new(model));

        let set = generator.generate_questions(&request()).await.unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.count_of(QuestionType::Technical), 2);
        assert_eq!(set.count_of(QuestionType::Behavioral), 1);

        let first = &set.questions[0];
        assert_eq!(first.question, "T1");
        assert_eq!(first.difficulty, Difficulty::Hard);
        assert_eq!(first.category, "algorithms");

        // defaults applied where the reply omitted fields
        let second = &set.questions[1];
        assert_eq!(second.difficulty, Difficulty::Medium);
        assert_eq!(second.category, "technical");
    }

    #[tokio::test]
    async fn falls_back_to_template_bank_on_failure() {
        let model = ScriptedModel::new(vec![Err(()), Err(())]);
        let generator = QuestionGenerator::new(Arc::new(model));

        let set = generator.generate_questions(&request()).await.unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.questions.iter().all(|q| !q.question.is_empty()));
        // fallback substitutes the role into templates that mention it
        assert!(set
            .questions
            .iter()
            .any(|q| q.question.contains("Backend Engineer")));
    }

    #[tokio::test]
    async fn malformed_reply_uses_fallback_for_that_type_only() {
        let behavioral = r#"[{"question": "B1"}]"#;
        let model = ScriptedModel::new(vec![Ok("not json at all".into()), Ok(behavioral.into())]);
        let generator = QuestionGenerator::new(Arc::new(model));

        let set = generator.generate_questions(&request()).await.unwrap();
        assert_eq!(set.count_of(QuestionType::Technical), 2);
        let behavioral: Vec<_> = set
            .questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Behavioral)
            .collect();
        assert_eq!(behavioral[0].question, "B1");
    }

    #[tokio::test]
    async fn zero_counts_skip_generation() {
        let model = ScriptedModel::new(Vec::new());
        let generator = QuestionGenerator::new(Arc::new(model));
        let mut req = request();
        req.num_technical = 0;
        req.num_behavioral = 0;

        let set = generator.generate_questions(&req).await.unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn bank_covers_every_type_and_level() {
        for question_type in [
            QuestionType::Technical,
            QuestionType::Behavioral,
            QuestionType::Situational,
            QuestionType::SystemDesign,
        ] {
            for level in [
                ExperienceLevel::Junior,
                ExperienceLevel::Mid,
                ExperienceLevel::Senior,
            ] {
                assert!(!template_bank(question_type, level).is_empty());
            }
        }
    }
}
