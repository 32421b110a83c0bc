use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gazette_core::{AcquisitionPipeline, OpenAiGenerator, PipelineError, RunReport, date_stamp};
use gazette_quiz::{DEFAULT_QUESTION_COUNT, Language, ParseOutcome, Question, QuizGenerator};
use gazette_reporting::{ExportFormat, FileSink, WriterSink};

mod schedule;
mod settings;

use settings::{PipelineArgs, Settings};

/// Daily digest of newly published legal acts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level (GAZETTE_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, save and summarize new acts once
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run once a day at a fixed local time, until interrupted
    Daily {
        /// Local wall-clock time, HH:MM
        #[arg(long, value_parser = schedule::parse_at)]
        at: NaiveTime,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse a file of generated quiz questions and report the counts
    ParseQuiz {
        file: PathBuf,
        #[arg(long, default_value = "en")]
        language: Language,
    },
    /// Generate quiz questions for a category
    Quiz {
        category: String,
        #[arg(long, default_value_t = DEFAULT_QUESTION_COUNT)]
        count: usize,
        #[arg(long, default_value = "en")]
        language: Language,
        /// Use the built-in questions instead of the generation service
        #[arg(long)]
        offline: bool,
        /// OpenAI API key (otherwise OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Report format: text, markdown or json
    #[arg(long, default_value = "text")]
    format: ExportFormat,

    /// Write the report here instead of stdout; `{date}` expands to YYYYMMDD
    #[arg(long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("GAZETTE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { pipeline, output } => {
            let settings = Settings::resolve(&pipeline)?;
            let report = run_once(&settings, &output).await?;
            print_counts(&report);
        }
        Command::Daily { at, pipeline, output } => {
            let settings = Settings::resolve(&pipeline)?;
            run_daily(&settings, &output, at).await?;
        }
        Command::ParseQuiz { file, language } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let outcome = gazette_quiz::parse_questions(&raw, language);
            print_quiz(&outcome);
        }
        Command::Quiz {
            category,
            count,
            language,
            offline,
            api_key,
        } => {
            let key = api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());
            let outcome = generate_quiz(&category, count, language, offline, key).await?;
            print_quiz(&outcome);
        }
    }
    Ok(())
}

fn build_generator(settings: &Settings) -> Result<OpenAiGenerator> {
    let key = settings
        .api_key
        .as_deref()
        .context("no OpenAI API key: set OPENAI_API_KEY or pass --api-key")?;
    let mut generator = OpenAiGenerator::new(key, Duration::from_secs(settings.pipeline.http_timeout_secs))?;
    if let Some(model) = &settings.model {
        generator = generator.with_model(model);
    }
    if let Some(base_url) = &settings.base_url {
        generator = generator.with_base_url(base_url);
    }
    Ok(generator)
}

async fn run_once(settings: &Settings, output: &OutputArgs) -> Result<RunReport> {
    let generator = build_generator(settings)?;
    let pipeline = AcquisitionPipeline::new(settings.pipeline.clone(), generator)?;
    log::info!(
        "checking {} (model {})",
        pipeline.config().listing_url,
        pipeline.generator().model()
    );

    let date = Local::now().date_naive();
    let stamp = date_stamp(date);
    let result = match &output.output {
        Some(path) => {
            let mut sink = FileSink::new(expand_date(path, &stamp), output.format, stamp.as_str());
            pipeline.run_on(date, &mut sink, |_| {}).await
        }
        None => {
            let mut sink = WriterSink::new(io::stdout(), output.format, stamp.as_str());
            pipeline.run_on(date, &mut sink, |_| {}).await
        }
    };

    match result {
        Ok(report) => Ok(report),
        Err(PipelineError::Sink { source, report }) => {
            print_counts(&report);
            Err(source).context("writing the report failed after processing")
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_daily(settings: &Settings, output: &OutputArgs, at: NaiveTime) -> Result<()> {
    loop {
        let wait = schedule::until_next(Local::now().naive_local(), at);
        log::info!("next run at {} (in {} min)", at.format("%H:%M"), wait.as_secs() / 60);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted, stopping");
                return Ok(());
            }
        }

        match run_once(settings, output).await {
            Ok(report) => print_counts(&report),
            Err(e) => log::error!("daily run failed: {:#}", e),
        }
    }
}

async fn generate_quiz(
    category: &str,
    count: usize,
    language: Language,
    offline: bool,
    api_key: Option<String>,
) -> Result<ParseOutcome> {
    let key = api_key.filter(|k| !k.trim().is_empty());
    let generator = match key {
        Some(key) if !offline => OpenAiGenerator::new(key, Duration::from_secs(60))?,
        _ => {
            let questions = gazette_quiz::offline_bank(language, category);
            if questions.is_empty() {
                anyhow::bail!(
                    "no offline questions for {:?}; available: {}",
                    category,
                    gazette_quiz::categories(language).join(", ")
                );
            }
            log::info!("using {} offline question(s)", questions.len());
            return Ok(ParseOutcome {
                questions,
                malformed: Vec::new(),
            });
        }
    };
    let quiz = QuizGenerator::new(generator, language);
    Ok(quiz.fetch_questions(category, count).await?)
}

fn expand_date(path: &Path, stamp: &str) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace("{date}", stamp))
}

fn print_counts(report: &RunReport) {
    if report.nothing_new() {
        eprintln!("No new acts.");
        return;
    }
    eprintln!(
        "{} candidate(s): {} summarized, {} skipped",
        report.candidates_found,
        report.succeeded(),
        report.skipped_count()
    );
    for skipped in &report.skipped {
        eprintln!("  skipped {} ({})", skipped.url, skipped.reason);
    }
}

fn print_quiz(outcome: &ParseOutcome) {
    for (n, question) in outcome.questions.iter().enumerate() {
        print_question(n + 1, question);
    }
    for malformed in &outcome.malformed {
        eprintln!("block {}: {}", malformed.index + 1, malformed.reason);
    }
    println!(
        "{} question(s) parsed, {} malformed block(s)",
        outcome.questions.len(),
        outcome.malformed.len()
    );
}

fn print_question(n: usize, question: &Question) {
    println!("{}. {}", n, question.prompt);
    for choice in gazette_quiz::Choice::ALL {
        let mark = if question.is_correct(choice) { "*" } else { " " };
        println!("  {}{}) {}", mark, choice, question.option(choice));
    }
    if let Some(image) = &question.image {
        println!("  image: {}", image);
    }
    println!();
}
