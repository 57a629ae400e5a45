//! Terminal practice loop: creates a session, asks the questions, grades the
//! answers, and prints the summary and progress at the end.

use std::fmt;
use std::io::{BufRead, Write};
use std::time::Instant;

use prep_core::Clock;
use prep_core::model::{ExperienceLevel, InterviewMode, SessionStatus, UserId};
use services::{AppServices, CreateSessionRequest, SessionManager};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { flag: &'static str, raw: String },
    InvalidLevel(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidLevel(raw) => {
                write!(f, "invalid --level value: {raw} (junior|mid|senior)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    db_url: String,
    candidate_name: String,
    target_role: String,
    experience_level: ExperienceLevel,
    num_technical: u8,
    num_behavioral: u8,
    num_situational: u8,
    num_system_design: u8,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>      database (default sqlite:practice.sqlite3)");
    eprintln!("  --name <name>          candidate name (default Candidate)");
    eprintln!("  --role <role>          target role (default Software Engineer)");
    eprintln!("  --level <level>        junior | mid | senior (default mid)");
    eprintln!("  --technical <n>        technical questions (default 2)");
    eprintln!("  --behavioral <n>       behavioral questions (default 1)");
    eprintln!("  --situational <n>      situational questions (default 0)");
    eprintln!("  --design <n>           system design questions (default 0)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_DB_URL, PREP_AI_API_KEY, PREP_AI_BASE_URL, PREP_AI_MODEL");
    eprintln!();
    eprintln!("During the interview, type your answer and press enter.");
    eprintln!("Type 'skip' to skip a question, 'quit' to cancel the session.");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_count(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<u8, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse().map_err(|_| ArgsError::InvalidCount { flag, raw })
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("PREP_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://practice.sqlite3".into(), normalize_sqlite_url),
            candidate_name: "Candidate".into(),
            target_role: "Software Engineer".into(),
            experience_level: ExperienceLevel::Mid,
            num_technical: 2,
            num_behavioral: 1,
            num_situational: 0,
            num_system_design: 0,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--name" => parsed.candidate_name = require_value(&mut args, "--name")?,
                "--role" => parsed.target_role = require_value(&mut args, "--role")?,
                "--level" => {
                    let raw = require_value(&mut args, "--level")?;
                    parsed.experience_level = match raw.as_str() {
                        "junior" => ExperienceLevel::Junior,
                        "mid" => ExperienceLevel::Mid,
                        "senior" => ExperienceLevel::Senior,
                        _ => return Err(ArgsError::InvalidLevel(raw)),
                    };
                }
                "--technical" => parsed.num_technical = parse_count(&mut args, "--technical")?,
                "--behavioral" => parsed.num_behavioral = parse_count(&mut args, "--behavioral")?,
                "--situational" => {
                    parsed.num_situational = parse_count(&mut args, "--situational")?;
                }
                "--design" => parsed.num_system_design = parse_count(&mut args, "--design")?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }
    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

fn read_line(prompt: &str) -> Result<String, std::io::Error> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run_interview(
    manager: &SessionManager,
    args: &Args,
    user_id: UserId,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = manager
        .create_session(&CreateSessionRequest {
            user_id: Some(user_id),
            candidate_name: args.candidate_name.clone(),
            candidate_email: format!(
                "{}@local",
                args.candidate_name.to_lowercase().replace(' ', ".")
            ),
            target_role: args.target_role.clone(),
            target_company: None,
            experience_level: args.experience_level,
            interview_mode: InterviewMode::Practice,
            resume_context: None,
            focus_areas: Vec::new(),
            num_technical: args.num_technical,
            num_behavioral: args.num_behavioral,
            num_situational: args.num_situational,
            num_system_design: args.num_system_design,
        })
        .await?;
    let id = session.session_id();
    let total = session.total_questions();
    manager.start_session(id).await?;

    println!(
        "\nPractice session for {} ({} questions). 'skip' skips, 'quit' cancels.\n",
        args.target_role, total
    );

    for index in 0..total {
        let session = manager.get_session(id).await?;
        let slot = session.response(index).ok_or("question slot missing")?;
        println!(
            "[{}/{}] ({}, {}) {}",
            index + 1,
            total,
            slot.question_type(),
            slot.difficulty(),
            slot.question()
        );

        let started = Instant::now();
        let answer = read_line("> ")?;
        let spent = u32::try_from(started.elapsed().as_secs()).unwrap_or(u32::MAX);

        match answer.as_str() {
            "quit" => {
                manager.cancel_session(id).await?;
                println!("Session cancelled.");
                return Ok(());
            }
            "skip" | "" => {
                manager.skip_question(id, index).await?;
                println!("Skipped.\n");
            }
            _ => {
                let session = manager.submit_answer(id, index, answer, spent).await?;
                let slot = session.response(index).ok_or("question slot missing")?;
                if let Some(score) = slot.evaluation_score() {
                    println!("Score: {score:.0}/100");
                }
                if let Some(feedback) = slot.feedback_summary() {
                    if !feedback.is_empty() {
                        println!("{feedback}");
                    }
                }
                println!();
            }
        }
    }

    let session = manager.complete_session(id).await?;
    debug_assert_eq!(session.status(), SessionStatus::Completed);

    println!("--- Session complete ---");
    if let Some(average) = session.average_score() {
        println!("Average score: {average:.1}");
    } else {
        println!("No questions answered.");
    }
    if let Some(summary) = session.session_summary() {
        println!("{summary}");
    }
    for recommendation in session.recommendations() {
        println!("- {recommendation}");
    }

    let progress = manager.get_user_progress(user_id).await?;
    println!(
        "\nProgress: {} completed session(s), {} question(s) answered.",
        progress.completed_sessions, progress.total_questions_answered
    );
    let milestones = manager.get_milestones(user_id).await?;
    for milestone in milestones.iter().filter(|m| m.achieved) {
        println!("Milestone reached: {}", milestone.title);
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::system()).await?;
    if !services.llm_enabled() {
        println!("Note: no PREP_AI_API_KEY set; questions and grading use built-in fallbacks.");
    }

    let user_id = UserId::random();
    run_interview(services.session_manager().as_ref(), &args, user_id).await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
