use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use kuizottar_mcq::{
    find_record, read_store, ConceptRanker, Difficulty, GenerationRequest, GenerationSummary,
    JsonlQuizSink, KuizConfig, MultipartiteRanker, QuizRuntime, SourceDocument,
};
use serde_json::{json, Value};
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "kuiz", version, about = "Kuizottar multiple-choice quiz generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates a quiz and publishes it to the store.
    Generate(GenerateArgs),
    /// Shows a stored quiz by access code.
    Show {
        code: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Lists the most recent quizzes.
    List {
        /// Number of entries to display.
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Prints ranked concept candidates for a document.
    Rank {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Pre-fetched summary for `--topic`; a missing file means the topic was not found.
    #[arg(long, requires = "topic", conflicts_with_all = ["file", "text"])]
    summary_file: Option<PathBuf>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    count: Option<usize>,
    /// medium, hard or expert; anything else falls back to medium.
    #[arg(long, default_value = "medium")]
    difficulty: String,
    /// Seconds per question.
    #[arg(long)]
    time_limit: Option<u32>,
    #[arg(long)]
    attempts: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    topic: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct StoreArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured quiz store.
    #[arg(long)]
    store: Option<PathBuf>,
}

impl StoreArgs {
    fn load(&self) -> Result<(KuizConfig, PathBuf)> {
        let config = load_config(self.config.as_deref())?;
        let store = self
            .store
            .clone()
            .unwrap_or_else(|| config.store.path.clone());
        Ok((config, store))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => {
            let summary = generate(&args)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Show { code, store } => {
            let (_, path) = store.load()?;
            let details = show_quiz(&path, &code)?;
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        Commands::List { limit, store } => {
            let (_, path) = store.load()?;
            let rows = list_quizzes(&path, limit)?;
            if rows.is_empty() {
                println!("No quizzes found.");
            }
            for row in rows {
                println!("{row}");
            }
        }
        Commands::Rank { file, top, config } => {
            for line in rank_file(&file, top, config.as_deref())? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<KuizConfig> {
    path.map_or_else(
        || Ok(KuizConfig::default()),
        |path| KuizConfig::load(path).with_context(|| format!("loading {}", path.display())),
    )
}

fn read_document(source: &SourceArgs, summary_file: Option<&Path>) -> Result<SourceDocument> {
    ensure!(
        summary_file.is_none() || source.topic.is_some(),
        "--summary-file is only valid with --topic"
    );
    if let Some(file) = &source.file {
        return SourceDocument::from_file(file)
            .with_context(|| format!("reading {}", file.display()));
    }
    if let Some(text) = &source.text {
        return Ok(SourceDocument::inline(text.clone()));
    }
    let topic = source
        .topic
        .clone()
        .context("one of --file, --text or --topic is required")?;
    let summary = match summary_file {
        Some(path) => match fs::read_to_string(path) {
            Ok(summary) => Some(summary),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
        },
        None => None,
    };
    Ok(SourceDocument::topic(topic, summary))
}

fn generate(args: &GenerateArgs) -> Result<GenerationSummary> {
    let (config, store) = args.store.load()?;
    let mut document = read_document(&args.source, args.summary_file.as_deref())?;
    if let Some(title) = &args.title {
        document = document.with_title(title.clone());
    }
    let runtime = QuizRuntime::initialize(&config)?;
    let mut request = GenerationRequest::new(document)
        .with_difficulty(Difficulty::parse_lenient(&args.difficulty));
    request.count = args.count;
    request.time_per_question = args.time_limit;
    request.max_attempts = args.attempts;
    request.seed = args.seed;

    let mut quiz = runtime.generate(&request)?;
    let sink = JsonlQuizSink::new(&store)?;
    let record = Runtime::new()?.block_on(runtime.publish(&mut quiz, &sink))?;
    if let Some(log_path) = &config.logging.path {
        log_cli_event(
            log_path,
            LogLevel::Info,
            "kuiz.generate.published",
            json!({
                "access_code": record.access_code,
                "store": store.display().to_string(),
                "count": quiz.question_set.achieved(),
            }),
        )?;
    }
    Ok(quiz.summary())
}

fn show_quiz(store: &Path, code: &str) -> Result<Value> {
    let record = Runtime::new()?
        .block_on(find_record(store, code))?
        .with_context(|| format!("no quiz with access code {code}"))?;
    let set = record.question_set()?;
    Ok(json!({
        "title": record.title,
        "quiz_code": record.access_code,
        "created_at": record.created_at.format("%Y-%m-%d").to_string(),
        "data": set,
    }))
}

fn list_quizzes(store: &Path, limit: usize) -> Result<Vec<String>> {
    let records = Runtime::new()?.block_on(read_store(store))?;
    records
        .iter()
        .rev()
        .take(limit)
        .map(|record| {
            let set = record.question_set()?;
            Ok(format!(
                "{} | {} | {} | {} questions ({})",
                record.access_code,
                record.title,
                record.created_at.format("%Y-%m-%d %H:%M"),
                set.achieved(),
                set.meta.difficulty,
            ))
        })
        .collect()
}

fn rank_file(path: &Path, top: usize, config: Option<&Path>) -> Result<Vec<String>> {
    let config = load_config(config)?;
    let document =
        SourceDocument::from_file(path).with_context(|| format!("reading {}", path.display()))?;
    let Some(text) = document.source_text() else {
        return Ok(Vec::new());
    };
    let ranker = MultipartiteRanker::new(config.ranking);
    let candidates = ranker.rank(&text, top)?;
    Ok(candidates
        .iter()
        .map(|candidate| format!("{:.4}\t{}", candidate.salience, candidate.phrase))
        .collect())
}

fn log_cli_event(path: &Path, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
    let logger = JsonLogger::new(path)?;
    logger.log(&LogRecord::new("kuiz", level, message).with_metadata(metadata))
}
